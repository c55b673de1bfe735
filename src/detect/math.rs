//! Small fixed-size linear algebra for pose recovery.
//!
//! Everything here works on planar markers: corners are undistorted into
//! normalized image coordinates, a homography is fitted, and the homography
//! is decomposed into a rotation and translation. No general-purpose matrix
//! types, just what the pipeline needs.

use serde::Serialize;

const UNDISTORT_ITERATIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn scale(&self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    fn normalized(&self) -> Self {
        let n = self.norm();
        if n == 0.0 {
            *self
        } else {
            self.scale(1.0 / n)
        }
    }
}

/// Row-major 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3(pub [[f64; 3]; 3]);

impl Mat3 {
    pub fn identity() -> Self {
        Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    pub fn mul_vec(&self, v: &Vec3) -> Vec3 {
        let m = &self.0;
        Vec3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    fn from_columns(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self([
            [c0.x, c1.x, c2.x],
            [c0.y, c1.y, c2.y],
            [c0.z, c1.z, c2.z],
        ])
    }
}

/// Axis-angle vector to rotation matrix.
pub fn rodrigues(rvec: &Vec3) -> Mat3 {
    let theta = rvec.norm();
    if theta < 1e-12 {
        return Mat3::identity();
    }
    let k = rvec.scale(1.0 / theta);
    let (s, c) = theta.sin_cos();
    let v = 1.0 - c;
    Mat3([
        [
            c + k.x * k.x * v,
            k.x * k.y * v - k.z * s,
            k.x * k.z * v + k.y * s,
        ],
        [
            k.y * k.x * v + k.z * s,
            c + k.y * k.y * v,
            k.y * k.z * v - k.x * s,
        ],
        [
            k.z * k.x * v - k.y * s,
            k.z * k.y * v + k.x * s,
            c + k.z * k.z * v,
        ],
    ])
}

/// Rotation matrix back to an axis-angle vector.
pub fn mat_to_rvec(r: &Mat3) -> Vec3 {
    let m = &r.0;
    let trace = m[0][0] + m[1][1] + m[2][2];
    let cos_theta = ((trace - 1.0) / 2.0).clamp(-1.0, 1.0);
    let theta = cos_theta.acos();

    if theta < 1e-9 {
        return Vec3::default();
    }

    let sin_theta = theta.sin();
    if sin_theta.abs() > 1e-6 {
        let scale = theta / (2.0 * sin_theta);
        return Vec3::new(
            (m[2][1] - m[1][2]) * scale,
            (m[0][2] - m[2][0]) * scale,
            (m[1][0] - m[0][1]) * scale,
        );
    }

    // theta near pi: recover the axis from the diagonal.
    let xx = ((m[0][0] + 1.0) / 2.0).max(0.0).sqrt();
    let yy = ((m[1][1] + 1.0) / 2.0).max(0.0).sqrt();
    let zz = ((m[2][2] + 1.0) / 2.0).max(0.0).sqrt();
    let axis = Vec3::new(
        xx.copysign(m[2][1] - m[1][2]),
        yy.copysign(m[0][2] - m[2][0]),
        zz.copysign(m[1][0] - m[0][1]),
    )
    .normalized();
    axis.scale(theta)
}

/// Intrinsic Euler angles of a rotation matrix, in radians.
///
/// The result packs the x-rotation in `.x`, the z-rotation in `.y` and the
/// y-rotation in `.z`, so `.y` is the in-image-plane heading a top-down
/// camera sees.
pub fn euler_angles(r: &Mat3) -> Vec3 {
    let m = &r.0;
    let sy = (m[0][0] * m[0][0] + m[1][0] * m[1][0]).sqrt();

    let (x, y, z) = if sy < 1e-6 {
        (
            (-m[1][2]).atan2(m[1][1]),
            (-m[2][0]).atan2(sy),
            0.0,
        )
    } else {
        (
            m[2][1].atan2(m[2][2]),
            (-m[2][0]).atan2(sy),
            m[1][0].atan2(m[0][0]),
        )
    };
    Vec3::new(x, z, y)
}

/// Remove lens distortion from a pixel, yielding normalized coordinates.
///
/// Uses the 5-term model (k1, k2, p1, p2, k3) with a fixed-point iteration.
pub fn undistort(pixel: [f64; 2], camera_matrix: &[f64; 9], distortion: &[f64; 5]) -> [f64; 2] {
    let fx = camera_matrix[0];
    let cx = camera_matrix[2];
    let fy = camera_matrix[4];
    let cy = camera_matrix[5];
    let [k1, k2, p1, p2, k3] = *distortion;

    let x0 = (pixel[0] - cx) / fx;
    let y0 = (pixel[1] - cy) / fy;
    let mut x = x0;
    let mut y = y0;

    for _ in 0..UNDISTORT_ITERATIONS {
        let r2 = x * x + y * y;
        let radial = 1.0 + k1 * r2 + k2 * r2 * r2 + k3 * r2 * r2 * r2;
        let dx = 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
        let dy = p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y;
        x = (x0 - dx) / radial;
        y = (y0 - dy) / radial;
    }

    [x, y]
}

/// Pose of a square planar marker from its four image corners.
///
/// Corners are in ArUco order (top-left, top-right, bottom-right,
/// bottom-left) and the marker frame has its origin at the marker center,
/// x right, y up. Returns `(rvec, tvec)` in camera coordinates.
pub fn estimate_marker_pose(
    corners: &[[f64; 2]; 4],
    marker_length: f64,
    camera_matrix: &[f64; 9],
    distortion: &[f64; 5],
) -> (Vec3, Vec3) {
    let half = marker_length / 2.0;
    let object = [
        [-half, half],
        [half, half],
        [half, -half],
        [-half, -half],
    ];

    let mut image = [[0.0; 2]; 4];
    for (out, corner) in image.iter_mut().zip(corners) {
        *out = undistort(*corner, camera_matrix, distortion);
    }

    let h = homography(&object, &image);
    decompose_homography(&h)
}

/// Direct linear transform for four point pairs, h33 fixed to 1.
fn homography(object: &[[f64; 2]; 4], image: &[[f64; 2]; 4]) -> [f64; 9] {
    let mut a = [[0.0f64; 9]; 8];
    for i in 0..4 {
        let [ox, oy] = object[i];
        let [ix, iy] = image[i];
        a[2 * i] = [ox, oy, 1.0, 0.0, 0.0, 0.0, -ix * ox, -ix * oy, ix];
        a[2 * i + 1] = [0.0, 0.0, 0.0, ox, oy, 1.0, -iy * ox, -iy * oy, iy];
    }

    let h = solve_linear(&mut a);
    [h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0]
}

/// Gaussian elimination with partial pivoting on an 8x8 augmented system.
fn solve_linear(a: &mut [[f64; 9]; 8]) -> [f64; 8] {
    for col in 0..8 {
        let mut pivot = col;
        for row in col + 1..8 {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        a.swap(col, pivot);

        let lead = a[col][col];
        if lead.abs() < 1e-12 {
            continue;
        }
        for row in col + 1..8 {
            let factor = a[row][col] / lead;
            for k in col..9 {
                a[row][k] -= factor * a[col][k];
            }
        }
    }

    let mut x = [0.0f64; 8];
    for row in (0..8).rev() {
        let mut sum = a[row][8];
        for col in row + 1..8 {
            sum -= a[row][col] * x[col];
        }
        let lead = a[row][row];
        x[row] = if lead.abs() < 1e-12 { 0.0 } else { sum / lead };
    }
    x
}

fn decompose_homography(h: &[f64; 9]) -> (Vec3, Vec3) {
    let c1 = Vec3::new(h[0], h[3], h[6]);
    let c2 = Vec3::new(h[1], h[4], h[7]);
    let c3 = Vec3::new(h[2], h[5], h[8]);

    let mut scale = 2.0 / (c1.norm() + c2.norm());
    // The marker must sit in front of the camera.
    if c3.z * scale < 0.0 {
        scale = -scale;
    }

    let tvec = c3.scale(scale);
    let r1 = c1.scale(scale).normalized();
    let mut r2 = c2.scale(scale);
    r2 = Vec3::new(
        r2.x - r1.dot(&r2) * r1.x,
        r2.y - r1.dot(&r2) * r1.y,
        r2.z - r1.dot(&r2) * r1.z,
    )
    .normalized();
    let r3 = r1.cross(&r2);

    let rotation = Mat3::from_columns(r1, r2, r3);
    (mat_to_rvec(&rotation), tvec)
}
