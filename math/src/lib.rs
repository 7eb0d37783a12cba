use glam::Vec2;

/// Tolerance used by the polygon predicates. Matches the epsilon the
/// triangulator was tuned with.
pub const GEOM_EPSILON: f32 = 1e-6;

/// Twice the signed area of the triangle `a`, `b`, `c`. Positive for
/// counter-clockwise winding.
#[inline]
pub fn signed_area_2x(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Signed area of a closed polygon ring (shoelace). Positive for
/// counter-clockwise winding.
pub fn polygon_area(points: &[Vec2]) -> f32 {
    let mut sum = 0.0;
    for i in 0..points.len() {
        let j = (i + 1) % points.len();
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum / 2.0
}

/// True if `p` lies strictly inside triangle `a`, `b`, `c`. Works for
/// either winding by comparing the sub-area signs against the full
/// triangle's orientation.
pub fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let area_abc = signed_area_2x(a, b, c);
    let area_pab = signed_area_2x(p, a, b);
    let area_pbc = signed_area_2x(p, b, c);
    let area_pca = signed_area_2x(p, c, a);

    if area_abc > GEOM_EPSILON {
        area_pab >= -GEOM_EPSILON && area_pbc >= -GEOM_EPSILON && area_pca >= -GEOM_EPSILON
    } else if area_abc < -GEOM_EPSILON {
        area_pab <= GEOM_EPSILON && area_pbc <= GEOM_EPSILON && area_pca <= GEOM_EPSILON
    } else {
        // Degenerate triangle
        false
    }
}

/// Even-odd test of `p` against an arbitrary polygon ring.
pub fn point_in_polygon(p: Vec2, points: &[Vec2]) -> bool {
    if points.is_empty() {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[j];
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Closest point to `p` on the segment `a`..`b`, and the clamped
/// parametric position of that point along the segment.
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> (Vec2, f32) {
    let d = b - a;
    let len_sq = d.length_squared();
    if len_sq <= f32::EPSILON {
        return (a, 0.0);
    }
    let t = ((p - a).dot(d) / len_sq).clamp(0.0, 1.0);
    (a + d * t, t)
}

/// Do a 2d projection of `this` onto `onto`.
#[inline]
fn project_vec2d(this: Vec2, onto: Vec2) -> Vec2 {
    let d = onto.dot(onto);
    if d > 0.0 {
        let dp = this.dot(onto);
        return onto * (dp / d);
    }
    onto
}

#[inline]
pub fn circle_point_intersect(origin: Vec2, radius: f32, point: Vec2) -> bool {
    (point - origin).length() < radius
}

/// True if the infinite line through `l_start`..`l_end` passes within
/// `c_radius` of `c_origin`.
#[inline]
pub fn circle_line_collide(c_origin: Vec2, c_radius: f32, l_start: Vec2, l_end: Vec2) -> bool {
    let lc = c_origin - l_start;
    let p = project_vec2d(lc, l_end - l_start);
    let nearest = l_start + p;

    circle_point_intersect(c_origin, c_radius, nearest)
}

/// True if the line segment from `s_start` to `s_end` penetrates the circle
#[inline]
pub fn circle_seg_collide(c_origin: Vec2, c_radius: f32, s_start: Vec2, s_end: Vec2) -> bool {
    let lc = c_origin - s_start;
    let d = s_end - s_start;
    let p = project_vec2d(lc, d);
    let nearest = s_start + p;

    circle_point_intersect(c_origin, c_radius, nearest)
        && p.length() < d.length()
        && p.dot(d) > f32::EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn triangle_winding_signs() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        let c = Vec2::new(0.0, 10.0);
        assert!(signed_area_2x(a, b, c) > 0.0);
        assert!(signed_area_2x(a, c, b) < 0.0);
    }

    #[test]
    fn square_area() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(0.0, 100.0),
        ];
        assert_eq!(polygon_area(&square), 10000.0);
        let mut rev = square;
        rev.reverse();
        assert_eq!(polygon_area(&rev), -10000.0);
    }

    #[test]
    fn point_in_triangle_both_windings() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(100.0, 0.0);
        let c = Vec2::new(50.0, 100.0);
        let p = Vec2::new(50.0, 30.0);
        assert!(point_in_triangle(p, a, b, c));
        assert!(point_in_triangle(p, c, b, a));
        assert!(!point_in_triangle(Vec2::new(-10.0, 30.0), a, b, c));
    }

    #[test]
    fn point_in_polygon_l_shape() {
        let l_shape = [
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 50.0),
            Vec2::new(50.0, 50.0),
            Vec2::new(50.0, 100.0),
            Vec2::new(0.0, 100.0),
        ];
        assert!(point_in_polygon(Vec2::new(25.0, 75.0), &l_shape));
        assert!(point_in_polygon(Vec2::new(75.0, 25.0), &l_shape));
        // The notch
        assert!(!point_in_polygon(Vec2::new(75.0, 75.0), &l_shape));
    }

    #[test]
    fn closest_point_clamps_to_endpoints() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);

        let (p, t) = closest_point_on_segment(Vec2::new(5.0, 3.0), a, b);
        assert_eq!(p, Vec2::new(5.0, 0.0));
        assert_eq!(t, 0.5);

        let (p, t) = closest_point_on_segment(Vec2::new(-5.0, 3.0), a, b);
        assert_eq!(p, a);
        assert_eq!(t, 0.0);

        let (p, t) = closest_point_on_segment(Vec2::new(25.0, 0.0), a, b);
        assert_eq!(p, b);
        assert_eq!(t, 1.0);
    }

    #[test]
    fn circle_seg() {
        let origin = Vec2::new(5.0, 7.0);
        assert!(circle_seg_collide(
            origin,
            5.0,
            Vec2::new(1.0, 3.0),
            Vec2::new(7.0, 20.0)
        ));
        assert!(!circle_seg_collide(
            origin,
            2.0,
            Vec2::new(1.0, 3.0),
            Vec2::new(7.0, 20.0)
        ));
    }
}
