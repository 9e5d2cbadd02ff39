//! Planar partition (clipped Voronoi diagram) over a set of sites.
//!
//! The diagram itself comes from `voronoice`; this module flattens it
//! into an arena of [`Cell`]s and [`Edge`]s indexed by [`SiteId`], plus a
//! `petgraph` adjacency graph whose node index equals the site id.
//!
//! Adjacency is read off the clipped polygons rather than the Delaunay
//! triangulation: two sites whose shared Voronoi edge lies outside the
//! surface are not neighbors here.

use geo::{Centroid, LineString, Polygon};
use petgraph::graph::{NodeIndex, UnGraph};
use voronoice::{BoundingBox, ClipBehavior, VoronoiBuilder};

use crate::types::{Dimensions, Point, SiteId};

// ---------------------------------------------------------------------------
// Type conversions at the module boundary
// ---------------------------------------------------------------------------

const fn to_voronoi(p: Point) -> voronoice::Point {
    voronoice::Point { x: p.x, y: p.y }
}

const fn from_voronoi(p: &voronoice::Point) -> Point {
    Point::new(p.x, p.y)
}

// ---------------------------------------------------------------------------
// Arena types
// ---------------------------------------------------------------------------

/// A site paired with its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    /// Arena index within the owning partition.
    pub id: SiteId,
    /// Site position.
    pub point: Point,
}

/// A boundary between two neighboring cells.
///
/// `right` is `None` when the edge lies on the region boundary and has no
/// cell on its far side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Site on one side.
    pub left: SiteId,
    /// Site on the other side, if any.
    pub right: Option<SiteId>,
}

impl Edge {
    /// The site across this edge as seen from `site`.
    ///
    /// Returns `None` for boundary edges and for edges `site` does not
    /// touch.
    #[must_use]
    pub fn other_side(&self, site: SiteId) -> Option<SiteId> {
        if self.left == site {
            self.right
        } else if self.right == Some(site) {
            Some(self.left)
        } else {
            None
        }
    }
}

/// One cell of the partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// The site that owns this cell.
    pub site: SiteId,
    /// Indices into [`Partition::edges`] of the edges bounding this cell.
    pub halfedges: Vec<usize>,
    /// Clipped cell polygon (open ring).
    pub polygon: Vec<Point>,
}

impl Cell {
    /// Whether clipping left this cell without any area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygon.is_empty()
    }

    /// Area centroid of the cell polygon.
    ///
    /// `None` for cells with fewer than three vertices.
    #[must_use]
    pub fn centroid(&self) -> Option<Point> {
        if self.polygon.len() < 3 {
            return None;
        }
        let ring: LineString<f64> = self.polygon.iter().map(|p| (p.x, p.y)).collect();
        Polygon::new(ring, vec![])
            .centroid()
            .map(|c| Point::new(c.x(), c.y()))
    }
}

// ---------------------------------------------------------------------------
// Partition
// ---------------------------------------------------------------------------

/// A Voronoi partition clipped to the drawing surface.
#[derive(Debug, Clone)]
pub struct Partition {
    sites: Vec<Point>,
    cells: Vec<Cell>,
    edges: Vec<Edge>,
    graph: UnGraph<SiteId, usize>,
}

impl Partition {
    /// Build the partition of `sites`, clipped to `dimensions`.
    ///
    /// Returns `None` when the diagram cannot be built (fewer than three
    /// sites, or all sites collinear).
    #[must_use]
    pub fn build(sites: &[Point], dimensions: Dimensions) -> Option<Self> {
        let bbox = BoundingBox::new(
            to_voronoi(dimensions.center()),
            f64::from(dimensions.width),
            f64::from(dimensions.height),
        );
        let voronoi = VoronoiBuilder::default()
            .set_sites(sites.iter().copied().map(to_voronoi).collect())
            .set_bounding_box(bbox)
            .set_clip_behavior(ClipBehavior::Clip)
            .build()?;

        let cells = (0..voronoi.sites().len())
            .map(|i| {
                let cell = voronoi.cell(i);
                (
                    from_voronoi(cell.site_position()),
                    cell.iter_vertices().map(from_voronoi).collect(),
                )
            })
            .collect();
        Some(Self::from_cells(cells))
    }

    /// Build a partition from already clipped cells, given as
    /// `(site, polygon)` pairs in site order.
    ///
    /// Two cells are neighbors when their polygons share a segment, i.e.
    /// at least two distinct vertices. Polygon segments shared with no
    /// other cell become boundary edges.
    #[must_use]
    pub fn from_cells(cells: Vec<(Point, Vec<Point>)>) -> Self {
        let (sites, mut cells): (Vec<Point>, Vec<Cell>) = cells
            .into_iter()
            .enumerate()
            .map(|(i, (site, polygon))| {
                (
                    site,
                    Cell {
                        site: SiteId(i),
                        halfedges: Vec::new(),
                        polygon,
                    },
                )
            })
            .unzip();

        let n = cells.len();
        let mut edges = Vec::new();
        for a in 0..n {
            for b in (a + 1)..n {
                if shares_segment(&cells[a].polygon, &cells[b].polygon) {
                    let e = edges.len();
                    edges.push(Edge {
                        left: SiteId(a),
                        right: Some(SiteId(b)),
                    });
                    cells[a].halfedges.push(e);
                    cells[b].halfedges.push(e);
                }
            }
        }

        let open: Vec<usize> = cells
            .iter()
            .map(|cell| {
                ring_segments(&cell.polygon)
                    .filter(|&(u, v)| u.distance_squared(v) > VERTEX_TOLERANCE_SQ)
                    .filter(|&(u, v)| {
                        !cell.halfedges.iter().any(|&h| {
                            edges[h]
                                .other_side(cell.site)
                                .and_then(|other| cells.get(other.index()))
                                .is_some_and(|other| {
                                    has_vertex(&other.polygon, u) && has_vertex(&other.polygon, v)
                                })
                        })
                    })
                    .count()
            })
            .collect();
        for (i, count) in open.into_iter().enumerate() {
            for _ in 0..count {
                let e = edges.len();
                edges.push(Edge {
                    left: SiteId(i),
                    right: None,
                });
                cells[i].halfedges.push(e);
            }
        }

        let graph = neighbor_graph(n, &edges);
        Self {
            sites,
            cells,
            edges,
            graph,
        }
    }

    /// Number of cells (equal to the number of sites).
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the partition has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Site positions, indexed by [`SiteId`].
    #[must_use]
    pub fn sites(&self) -> &[Point] {
        &self.sites
    }

    /// Cells, indexed by [`SiteId`].
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// All edges, including boundary edges.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Adjacency graph between interior neighbors. Node index `i` is
    /// `SiteId(i)`; edge weights index into [`edges`](Self::edges).
    #[must_use]
    pub const fn graph(&self) -> &UnGraph<SiteId, usize> {
        &self.graph
    }

    /// The site with the given id.
    #[must_use]
    pub fn site(&self, id: SiteId) -> Option<Site> {
        self.sites.get(id.index()).map(|&point| Site { id, point })
    }

    /// The cell owned by the given site.
    #[must_use]
    pub fn cell(&self, id: SiteId) -> Option<&Cell> {
        self.cells.get(id.index())
    }

    /// The first cell, in partition order, that has any area.
    #[must_use]
    pub fn first_nonempty(&self) -> Option<SiteId> {
        self.cells.iter().find(|c| !c.is_empty()).map(|c| c.site)
    }

    /// Sites across the bounding edges of `id`'s cell, skipping boundary
    /// edges.
    #[must_use]
    pub fn exits(&self, id: SiteId) -> Vec<SiteId> {
        self.cell(id).map_or_else(Vec::new, |cell| {
            cell.halfedges
                .iter()
                .filter_map(|&h| self.edges.get(h))
                .filter_map(|edge| edge.other_side(id))
                .collect()
        })
    }

    /// Interior neighbors of `id`, read from the adjacency graph.
    pub fn neighbors(&self, id: SiteId) -> impl Iterator<Item = SiteId> + '_ {
        self.graph
            .neighbors(NodeIndex::new(id.index()))
            .map(|n| self.graph[n])
    }

    /// Area centroid of every cell, indexed by [`SiteId`].
    #[must_use]
    pub fn centroids(&self) -> Vec<Option<Point>> {
        self.cells.iter().map(Cell::centroid).collect()
    }
}

/// Vertices closer than this (in pixels) are the same vertex.
const VERTEX_TOLERANCE: f64 = 1e-4;
const VERTEX_TOLERANCE_SQ: f64 = VERTEX_TOLERANCE * VERTEX_TOLERANCE;

fn has_vertex(polygon: &[Point], p: Point) -> bool {
    polygon
        .iter()
        .any(|q| q.distance_squared(p) <= VERTEX_TOLERANCE_SQ)
}

/// Consecutive vertex pairs of a closed ring.
fn ring_segments(polygon: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    polygon
        .iter()
        .copied()
        .zip(polygon.iter().copied().cycle().skip(1))
}

/// Whether two convex cells have a common boundary segment.
fn shares_segment(a: &[Point], b: &[Point]) -> bool {
    let common: Vec<Point> = a.iter().copied().filter(|&p| has_vertex(b, p)).collect();
    common.iter().enumerate().any(|(i, p)| {
        common[i + 1..]
            .iter()
            .any(|q| p.distance_squared(*q) > VERTEX_TOLERANCE_SQ)
    })
}

/// Build the interior adjacency graph from the edge list.
fn neighbor_graph(node_count: usize, edges: &[Edge]) -> UnGraph<SiteId, usize> {
    let interior = edges.iter().filter(|e| e.right.is_some()).count();
    let mut graph = UnGraph::with_capacity(node_count, interior);
    for i in 0..node_count {
        graph.add_node(SiteId(i));
    }
    for (e, edge) in edges.iter().enumerate() {
        if let Some(right) = edge.right {
            graph.add_edge(
                NodeIndex::new(edge.left.index()),
                NodeIndex::new(right.index()),
                e,
            );
        }
    }
    graph
}
