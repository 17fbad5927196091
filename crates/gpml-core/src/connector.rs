//! Connector geometry for line elements.
//!
//! A line's routed path is a list of straight [`Segment`]s. Anchors address
//! positions along that path through a normalized *line coordinate*
//! `t ∈ [0,1]` of accumulated length; [`ConnectorShape`] provides the two
//! coordinate maps between line coordinates and points, plus route
//! construction for the supported connector types.
//!
//! The segment list is a pure function of the line's current points (and,
//! for elbow routing, its attachment sides); editing layers rebuild it after
//! every geometry change through
//! [`PathwayModel::connector_shape`](crate::model::PathwayModel::connector_shape).

use crate::geometry::Point;

/// One straight sub-piece of a routed line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    start: Point,
    end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn start(self) -> Point {
        self.start
    }

    pub fn end(self) -> Point {
        self.end
    }

    pub fn length(self) -> f64 {
        self.start.distance_to(self.end)
    }

    pub fn center(self) -> Point {
        self.start.midpoint(self.end)
    }

    /// Closest point on this segment to `p`, with the clamped projection
    /// parameter `u ∈ [0,1]`. Zero-length segments project onto their start.
    fn project(self, p: Point) -> (Point, f64) {
        let d = self.end.sub_point(self.start);
        let len_sq = d.x() * d.x() + d.y() * d.y();
        if len_sq == 0.0 {
            return (self.start, 0.0);
        }
        let v = p.sub_point(self.start);
        let u = ((v.x() * d.x() + v.y() * d.y()) / len_sq).clamp(0.0, 1.0);
        (self.start.add_point(d.scale(u)), u)
    }
}

/// The side of a rectangular element a line attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    North,
    East,
    South,
    West,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn opposite(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

impl Side {
    /// Derives the attachment side from a relative offset in the target's
    /// local frame: the dominant axis wins.
    pub fn from_relative_offset(rel_x: f64, rel_y: f64) -> Side {
        if rel_x.abs() > rel_y.abs() {
            if rel_x > 0.0 { Side::East } else { Side::West }
        } else if rel_y > 0.0 {
            Side::South
        } else {
            Side::North
        }
    }

    fn axis(self) -> Axis {
        match self {
            Side::East | Side::West => Axis::X,
            Side::North | Side::South => Axis::Y,
        }
    }

    fn direction(self) -> f64 {
        match self {
            Side::East | Side::South => 1.0,
            Side::North | Side::West => -1.0,
        }
    }

    fn index(self) -> usize {
        match self {
            Side::North => 0,
            Side::East => 1,
            Side::South => 2,
            Side::West => 3,
        }
    }
}

/// Everything the router is allowed to know about a line: its endpoints, the
/// sides of the elements those endpoints attach to, and any preferred
/// waypoints the user dragged into place.
#[derive(Debug, Clone)]
pub struct ConnectorRestrictions {
    pub start: Point,
    pub end: Point,
    pub start_side: Side,
    pub end_side: Side,
    pub waypoints: Vec<Point>,
}

impl ConnectorRestrictions {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            start_side: Side::West,
            end_side: Side::East,
            waypoints: Vec::new(),
        }
    }
}

/// Perpendicular distance kept between an attachment side and the first
/// bend of an elbow route.
const SEGMENT_OFFSET: f64 = 20.0;

/// Waypoint counts for an elbow route, indexed by
/// `[left-point side][right-point side][left point below right?]`.
///
/// Sides are indexed north, east, south, west.
const ELBOW_WAYPOINT_NUMBERS: [[[usize; 2]; 4]; 4] = [
    [[1, 1], [2, 2], [1, 3], [0, 2]],
    [[2, 0], [1, 1], [0, 2], [1, 1]],
    [[3, 1], [2, 2], [1, 1], [2, 0]],
    [[2, 2], [3, 3], [2, 2], [1, 1]],
];

/// A routed polyline and the coordinate maps over it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorShape {
    segments: Vec<Segment>,
}

impl ConnectorShape {
    /// Builds the route as the polyline through the given waypoints.
    ///
    /// This is the route for straight, segmented and curved connectors; for
    /// curved lines the arc-length parameterization runs over the polyline,
    /// curve flattening being a rendering concern.
    pub fn from_waypoints(points: &[Point]) -> Self {
        let segments = points
            .windows(2)
            .map(|w| Segment::new(w[0], w[1]))
            .collect();
        Self { segments }
    }

    /// Builds an elbow route from the line's restrictions.
    ///
    /// Preferred waypoints are honored when their count matches the route's
    /// expected bend count; otherwise default waypoints are synthesized at a
    /// fixed offset from the attachment sides. Segments alternate between
    /// the horizontal and vertical axes, starting with the start side's
    /// axis.
    pub fn elbow(restrictions: &ConnectorRestrictions) -> Self {
        let nr_segments = elbow_segment_count(restrictions);
        let waypoints = if restrictions.waypoints.len() == nr_segments - 2 {
            restrictions.waypoints.clone()
        } else {
            elbow_waypoints(restrictions, nr_segments)
        };
        Self {
            segments: elbow_segments(restrictions, &waypoints, nr_segments),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Total length of the routed path.
    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(|s| s.length()).sum()
    }

    /// Maps a line coordinate to the point at that fraction of accumulated
    /// route length. `t` is clamped to `[0,1]`; degenerate routes yield the
    /// start point.
    pub fn point_at_line_coordinate(&self, t: f64) -> Point {
        let Some(first) = self.segments.first() else {
            return Point::default();
        };
        let t = t.clamp(0.0, 1.0);
        let target = t * self.total_length();
        if target == 0.0 {
            return first.start();
        }
        let mut travelled = 0.0;
        for segment in &self.segments {
            let length = segment.length();
            if travelled + length >= target {
                if length == 0.0 {
                    return segment.start();
                }
                let u = (target - travelled) / length;
                let d = segment.end().sub_point(segment.start());
                return segment.start().add_point(d.scale(u));
            }
            travelled += length;
        }
        self.segments[self.segments.len() - 1].end()
    }

    /// Maps a point to the line coordinate of its closest position on the
    /// route.
    ///
    /// Every segment is tried with a clamped projection; the closest one
    /// wins, ties going to the first segment in list order so the result is
    /// stable.
    pub fn line_coordinate_at_point(&self, p: Point) -> f64 {
        let total = self.total_length();
        if self.segments.is_empty() || total == 0.0 {
            return 0.0;
        }
        let mut best_distance = f64::INFINITY;
        let mut best_t = 0.0;
        let mut travelled = 0.0;
        for segment in &self.segments {
            let (closest, u) = segment.project(p);
            let distance = closest.distance_to(p);
            if distance < best_distance {
                best_distance = distance;
                best_t = (travelled + u * segment.length()) / total;
            }
            travelled += segment.length();
        }
        best_t
    }
}

fn elbow_segment_count(restrictions: &ConnectorRestrictions) -> usize {
    let (start, end) = (restrictions.start, restrictions.end);
    let left_to_right = end.x() - start.x() > 0.0;
    let (left, right) = if left_to_right {
        (start, end)
    } else {
        (end, start)
    };
    let left_bottom = right.y() - left.y() < 0.0;

    let z = if left_bottom { 0 } else { 1 };
    let (x, y) = if left_to_right {
        (restrictions.start_side, restrictions.end_side)
    } else {
        (restrictions.end_side, restrictions.start_side)
    };
    ELBOW_WAYPOINT_NUMBERS[x.index()][y.index()][z] + 2
}

fn elbow_waypoint(start: Point, end: Point, axis: Axis, direction: f64) -> Point {
    match axis {
        Axis::Y => Point::new(
            start.x() + (end.x() - start.x()) / 2.0,
            start.y() + SEGMENT_OFFSET * direction,
        ),
        Axis::X => Point::new(
            start.x() + SEGMENT_OFFSET * direction,
            start.y() + (end.y() - start.y()) / 2.0,
        ),
    }
}

fn elbow_waypoints(restrictions: &ConnectorRestrictions, nr_segments: usize) -> Vec<Point> {
    let start = restrictions.start;
    let end = restrictions.end;
    let start_axis = restrictions.start_side.axis();
    let start_direction = restrictions.start_side.direction();
    let end_axis = restrictions.end_side.axis();
    let end_direction = restrictions.end_side.direction();

    match nr_segments - 2 {
        1 => vec![elbow_waypoint(start, end, start_axis, start_direction)],
        2 => {
            let first = elbow_waypoint(
                start,
                Point::new(
                    end.x() + SEGMENT_OFFSET * end_direction,
                    end.y() + SEGMENT_OFFSET * end_direction,
                ),
                start_axis,
                start_direction,
            );
            let second = elbow_waypoint(end, first, end_axis, end_direction);
            vec![first, second]
        }
        3 => {
            let middle = start.midpoint(end);
            vec![
                elbow_waypoint(start, middle, start_axis, start_direction),
                middle,
                elbow_waypoint(end, middle, end_axis, end_direction),
            ]
        }
        _ => Vec::new(),
    }
}

/// A segment from `start` running toward `end` along one axis only.
fn straight_segment(start: Point, end: Point, axis: Axis) -> Segment {
    let end = match axis {
        Axis::X => Point::new(end.x(), start.y()),
        Axis::Y => Point::new(start.x(), end.y()),
    };
    Segment::new(start, end)
}

fn elbow_segments(
    restrictions: &ConnectorRestrictions,
    waypoints: &[Point],
    nr_segments: usize,
) -> Vec<Segment> {
    let start = restrictions.start;
    let end = restrictions.end;
    let start_axis = restrictions.start_side.axis();

    if nr_segments == 2 {
        let first = straight_segment(start, end, start_axis);
        let second = straight_segment(first.end(), end, start_axis.opposite());
        return vec![first, second];
    }

    let mut segments = Vec::with_capacity(nr_segments);
    segments.push(straight_segment(start, waypoints[0], start_axis));
    let mut axis = start_axis.opposite();
    for i in 0..waypoints.len().saturating_sub(1) {
        segments.push(straight_segment(segments[i].end(), waypoints[i + 1], axis));
        axis = axis.opposite();
    }
    let before_last = straight_segment(segments[segments.len() - 1].end(), end, axis);
    segments.push(before_last);
    segments.push(straight_segment(
        before_last.end(),
        end,
        restrictions.end_side.axis(),
    ));
    segments
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    fn polyline() -> ConnectorShape {
        // 10 units right, 10 up, 10 right: total length 30
        ConnectorShape::from_waypoints(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, -10.0),
            Point::new(20.0, -10.0),
        ])
    }

    #[test]
    fn test_total_length() {
        assert_eq!(polyline().total_length(), 30.0);
    }

    #[test]
    fn test_point_at_line_coordinate() {
        let shape = polyline();
        assert_eq!(shape.point_at_line_coordinate(0.0), Point::new(0.0, 0.0));
        assert_eq!(shape.point_at_line_coordinate(1.0), Point::new(20.0, -10.0));
        // halfway: 15 units in, 5 units up the middle segment
        assert_eq!(shape.point_at_line_coordinate(0.5), Point::new(10.0, -5.0));
        // clamped outside [0,1]
        assert_eq!(shape.point_at_line_coordinate(-1.0), Point::new(0.0, 0.0));
        assert_eq!(shape.point_at_line_coordinate(2.0), Point::new(20.0, -10.0));
    }

    #[test]
    fn test_line_coordinate_at_point() {
        let shape = polyline();
        assert_eq!(shape.line_coordinate_at_point(Point::new(0.0, 0.0)), 0.0);
        assert_eq!(
            shape.line_coordinate_at_point(Point::new(20.0, -10.0)),
            1.0
        );
        // off-route point projects onto the middle segment
        let t = shape.line_coordinate_at_point(Point::new(12.0, -5.0));
        assert!(approx_eq!(f64, t, 0.5, epsilon = 1e-9));
    }

    #[test]
    fn test_zero_length_segments_are_safe() {
        let shape = ConnectorShape::from_waypoints(&[
            Point::new(5.0, 5.0),
            Point::new(5.0, 5.0),
            Point::new(15.0, 5.0),
        ]);
        assert_eq!(shape.point_at_line_coordinate(0.0), Point::new(5.0, 5.0));
        assert_eq!(shape.point_at_line_coordinate(0.5), Point::new(10.0, 5.0));

        let degenerate =
            ConnectorShape::from_waypoints(&[Point::new(3.0, 4.0), Point::new(3.0, 4.0)]);
        assert_eq!(
            degenerate.point_at_line_coordinate(0.7),
            Point::new(3.0, 4.0)
        );
        assert_eq!(degenerate.line_coordinate_at_point(Point::new(9.0, 9.0)), 0.0);
    }

    #[test]
    fn test_empty_shape() {
        let shape = ConnectorShape::from_waypoints(&[]);
        assert_eq!(shape.point_at_line_coordinate(0.5), Point::default());
        assert_eq!(shape.line_coordinate_at_point(Point::new(1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_projection_tie_breaks_on_first_segment() {
        // A route that doubles back over itself: both segments contain the
        // query point, the first one must win.
        let shape = ConnectorShape::from_waypoints(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 0.0),
        ]);
        let t = shape.line_coordinate_at_point(Point::new(5.0, 0.0));
        assert!(approx_eq!(f64, t, 0.25, epsilon = 1e-9));
    }

    #[test]
    fn test_side_from_relative_offset() {
        assert_eq!(Side::from_relative_offset(1.0, 0.2), Side::East);
        assert_eq!(Side::from_relative_offset(-1.0, 0.2), Side::West);
        assert_eq!(Side::from_relative_offset(0.1, 1.0), Side::South);
        assert_eq!(Side::from_relative_offset(0.1, -1.0), Side::North);
    }

    #[test]
    fn test_elbow_route_is_rectilinear() {
        let mut restrictions =
            ConnectorRestrictions::new(Point::new(0.0, 0.0), Point::new(100.0, 60.0));
        restrictions.start_side = Side::East;
        restrictions.end_side = Side::West;
        let shape = ConnectorShape::elbow(&restrictions);
        assert!(shape.segments().len() >= 2);
        assert_eq!(shape.segments().first().unwrap().start(), restrictions.start);
        assert_eq!(shape.segments().last().unwrap().end(), restrictions.end);
        for segment in shape.segments() {
            let dx = (segment.end().x() - segment.start().x()).abs();
            let dy = (segment.end().y() - segment.start().y()).abs();
            assert!(dx == 0.0 || dy == 0.0, "segment is not axis-aligned");
        }
    }

    #[test]
    fn test_elbow_honors_matching_waypoint_preferences() {
        let mut restrictions =
            ConnectorRestrictions::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        restrictions.start_side = Side::East;
        restrictions.end_side = Side::West;
        let expected = elbow_segment_count(&restrictions);
        restrictions.waypoints = vec![Point::new(50.0, 30.0); expected - 2];
        let shape = ConnectorShape::elbow(&restrictions);
        assert_eq!(shape.segments().len(), expected);
    }

    #[test]
    fn test_elbow_connects_contiguously() {
        for (start_side, end_side) in [
            (Side::East, Side::West),
            (Side::North, Side::South),
            (Side::West, Side::West),
            (Side::South, Side::East),
        ] {
            let mut restrictions =
                ConnectorRestrictions::new(Point::new(10.0, 80.0), Point::new(200.0, 20.0));
            restrictions.start_side = start_side;
            restrictions.end_side = end_side;
            let shape = ConnectorShape::elbow(&restrictions);
            for pair in shape.segments().windows(2) {
                assert_eq!(pair[0].end(), pair[1].start());
            }
        }
    }
}

#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    /// Strictly x-monotone polylines cannot self-intersect, so the
    /// coordinate round trip is well-defined everywhere on them.
    fn monotone_polyline() -> impl Strategy<Value = Vec<Point>> {
        proptest::collection::vec((1.0f64..50.0, -40.0f64..40.0), 2..8).prop_map(|steps| {
            let mut x = 0.0;
            let mut points = vec![Point::new(0.0, 0.0)];
            for (dx, y) in steps {
                x += dx;
                points.push(Point::new(x, y));
            }
            points
        })
    }

    proptest! {
        #[test]
        fn line_coordinate_roundtrip(points in monotone_polyline(), t in 0.0f64..=1.0) {
            let shape = ConnectorShape::from_waypoints(&points);
            let p = shape.point_at_line_coordinate(t);
            let back = shape.line_coordinate_at_point(p);
            prop_assert!(approx_eq!(f64, back, t, epsilon = 1e-6));
        }

        #[test]
        fn point_at_is_on_route(points in monotone_polyline(), t in 0.0f64..=1.0) {
            let shape = ConnectorShape::from_waypoints(&points);
            let p = shape.point_at_line_coordinate(t);
            let distance = shape
                .segments()
                .iter()
                .map(|s| {
                    let d = s.end().sub_point(s.start());
                    let len = s.length();
                    if len == 0.0 {
                        return s.start().distance_to(p);
                    }
                    let v = p.sub_point(s.start());
                    let u = ((v.x() * d.x() + v.y() * d.y()) / (len * len)).clamp(0.0, 1.0);
                    s.start().add_point(d.scale(u)).distance_to(p)
                })
                .fold(f64::INFINITY, f64::min);
            prop_assert!(distance < 1e-6);
        }
    }
}
