//! Resolve raw segment endpoints to door or intersection nodes.
//!
//! Matching is strict: a candidate qualifies only when it is closer than the
//! threshold. Intersections are authoritative junctions, so doors are only
//! considered when no intersection qualifies. Within a class the closest
//! candidate wins and exact ties go to the earlier node in drawing order.
//!
//! [`match_point`] is the linear reference scan. [`PointIndex`] answers the
//! same question through a 2-D KD-tree per class and must always agree with it.

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;

use crate::geometry::Point;
use crate::graph::Node;

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

type Tree = KdTree<f64, usize, 2, BUCKET_SIZE, u32>;

/// Linear scan over intersections, then doors.
pub fn match_point<'a>(
    point: Point,
    doors: &'a [Node],
    intersections: &'a [Node],
    threshold: f64,
) -> Option<&'a str> {
    closest_linear(point, intersections, threshold)
        .or_else(|| closest_linear(point, doors, threshold))
}

fn closest_linear(point: Point, nodes: &[Node], threshold: f64) -> Option<&str> {
    let mut closest = threshold;
    let mut found = None;
    for node in nodes {
        let distance = point.distance_to(&node.position);
        if distance < closest {
            closest = distance;
            found = Some(node.id.as_str());
        }
    }
    found
}

/// Spatial index over one floor's doors and intersections.
pub struct PointIndex<'a> {
    doors: ClassIndex<'a>,
    intersections: ClassIndex<'a>,
}

struct ClassIndex<'a> {
    nodes: &'a [Node],
    tree: Tree,
}

impl<'a> ClassIndex<'a> {
    fn new(nodes: &'a [Node]) -> Self {
        let mut tree: Tree = KdTree::new();
        for (index, node) in nodes.iter().enumerate() {
            tree.add(&[node.position.x, node.position.y], index);
        }
        Self { nodes, tree }
    }

    fn closest(&self, point: Point, threshold: f64) -> Option<&'a str> {
        if self.nodes.is_empty() || !(threshold > 0.0) {
            return None;
        }

        // Squared radius is inclusive; the exact distance filter below keeps
        // the strict `<` contract of the linear scan.
        let candidates = self
            .tree
            .within::<SquaredEuclidean>(&[point.x, point.y], threshold * threshold);

        candidates
            .into_iter()
            .map(|neighbour| {
                let node = &self.nodes[neighbour.item];
                (point.distance_to(&node.position), neighbour.item)
            })
            .filter(|(distance, _)| *distance < threshold)
            .min_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
            .map(|(_, index)| self.nodes[index].id.as_str())
    }
}

impl<'a> PointIndex<'a> {
    pub fn new(doors: &'a [Node], intersections: &'a [Node]) -> Self {
        Self {
            doors: ClassIndex::new(doors),
            intersections: ClassIndex::new(intersections),
        }
    }

    /// Same contract as [`match_point`].
    pub fn match_point(&self, point: Point, threshold: f64) -> Option<&'a str> {
        self.intersections
            .closest(point, threshold)
            .or_else(|| self.doors.closest(point, threshold))
    }
}

impl std::fmt::Debug for PointIndex<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointIndex")
            .field("doors", &self.doors.nodes.len())
            .field("intersections", &self.intersections.nodes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{door, intersection};

    #[test]
    fn matches_door_within_threshold() {
        let doors = vec![door("D1", "F", 105.0, 102.0)];
        let found = match_point(Point::new(100.0, 100.0), &doors, &[], 10.0);
        assert_eq!(found, Some("D1"));
        assert_eq!(match_point(Point::new(300.0, 300.0), &doors, &[], 10.0), None);
    }

    #[test]
    fn threshold_is_strict() {
        let doors = vec![door("D1", "F", 10.0, 0.0)];
        assert_eq!(match_point(Point::new(0.0, 0.0), &doors, &[], 10.0), None);
        let index = PointIndex::new(&doors, &[]);
        assert_eq!(index.match_point(Point::new(0.0, 0.0), 10.0), None);
    }

    #[test]
    fn intersections_win_over_closer_doors() {
        let doors = vec![door("D1", "F", 1.0, 0.0)];
        let intersections = vec![intersection("I1", "F", 6.0, 0.0)];
        let found = match_point(Point::new(0.0, 0.0), &doors, &intersections, 10.0);
        assert_eq!(found, Some("I1"));
    }

    #[test]
    fn ties_go_to_first_in_scan_order() {
        let doors = vec![door("D1", "F", 3.0, 0.0), door("D2", "F", -3.0, 0.0)];
        assert_eq!(
            match_point(Point::new(0.0, 0.0), &doors, &[], 10.0),
            Some("D1")
        );
        let index = PointIndex::new(&doors, &[]);
        assert_eq!(index.match_point(Point::new(0.0, 0.0), 10.0), Some("D1"));
    }

    #[test]
    fn index_agrees_with_linear_scan() {
        let doors: Vec<Node> = (0..40)
            .map(|i| {
                let f = i as f64;
                door(&format!("D{i}"), "F", (f * 37.0) % 200.0, (f * 53.0) % 150.0)
            })
            .collect();
        let intersections: Vec<Node> = (0..25)
            .map(|i| {
                let f = i as f64;
                intersection(&format!("I{i}"), "F", (f * 71.0) % 200.0, (f * 29.0) % 150.0)
            })
            .collect();
        let index = PointIndex::new(&doors, &intersections);

        for step in 0..400 {
            let s = step as f64;
            let query = Point::new((s * 13.7) % 210.0, (s * 7.3) % 160.0);
            for threshold in [2.5, 10.0, 25.0] {
                assert_eq!(
                    index.match_point(query, threshold),
                    match_point(query, &doors, &intersections, threshold),
                    "query {query:?} threshold {threshold}"
                );
            }
        }
    }
}
