use crate::Point;
use crate::Vector;
use crate::geom::EPS;
use ndarray as nd;

/// Calculate rotation matrix for a unit vector `u` and angle `phi` (radians).
///
/// A rotation in 3D can be described with an axis and an angle around that
/// axis. Uses the Rodrigues formula, which is numerically stabler than the
/// direct element-wise matrix:
/// https://en.wikipedia.org/wiki/Rodrigues%27_rotation_formula
pub fn rotation_matrix(u: &Vector, phi: f64) -> nd::Array2<f64> {
    let w: nd::Array2<f64> = nd::arr2(&[[0., -u.dz, u.dy], [u.dz, 0., -u.dx], [-u.dy, u.dx, 0.]]);

    nd::Array::eye(3) + phi.sin() * &w + (2. * (phi / 2.).sin().powi(2)) * w.dot(&w)
}

/// Rotate points around the vector `u` with the angle `phi` (radians).
pub fn rotate_points_around_vector(pts: &[Point], u: &Vector, phi: f64) -> Vec<Point> {
    let u = match u.normalize() {
        Ok(v) => v,
        Err(_) => return pts.to_vec(),
    };
    if phi.abs() < EPS {
        // No need to rotate
        return pts.to_vec();
    }
    let rot = rotation_matrix(&u, phi);

    pts.iter()
        .map(|p| {
            let v = nd::arr1(&[p.x, p.y, p.z]);
            let r = rot.dot(&v);
            Point::new(r[0], r[1], r[2])
        })
        .collect()
}
