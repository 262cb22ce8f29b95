use stratum_geom::Vec3;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosY = 0,
    NegY = 1,
    PosX = 2,
    NegX = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosY,
        Face::NegY,
        Face::PosX,
        Face::NegX,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the unit-normal vector for this face.
    #[inline]
    pub fn normal(self) -> Vec3 {
        let (x, y, z) = self.delta();
        Vec3::new(x as f32, y as f32, z as f32)
    }

    /// Returns the integer grid delta `(dx,dy,dz)` when stepping out of this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    /// Unit-cube corners of this face, counter-clockwise when viewed from outside.
    #[inline]
    pub fn corners(self) -> [Vec3; 4] {
        let c = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
        match self {
            Face::PosY => [c(0., 1., 0.), c(0., 1., 1.), c(1., 1., 1.), c(1., 1., 0.)],
            Face::NegY => [c(0., 0., 0.), c(1., 0., 0.), c(1., 0., 1.), c(0., 0., 1.)],
            Face::PosX => [c(1., 0., 0.), c(1., 1., 0.), c(1., 1., 1.), c(1., 0., 1.)],
            Face::NegX => [c(0., 0., 0.), c(0., 0., 1.), c(0., 1., 1.), c(0., 1., 0.)],
            Face::PosZ => [c(0., 0., 1.), c(1., 0., 1.), c(1., 1., 1.), c(0., 1., 1.)],
            Face::NegZ => [c(0., 0., 0.), c(0., 1., 0.), c(1., 1., 0.), c(1., 0., 0.)],
        }
    }

    /// Projects a world-space point onto the two axes spanning this face.
    #[inline]
    pub fn uv_axes(self, p: Vec3) -> (f32, f32) {
        match self {
            Face::PosY | Face::NegY => (p.x, p.z),
            Face::PosX | Face::NegX => (p.z, p.y),
            Face::PosZ | Face::NegZ => (p.x, p.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_wind_outward() {
        for face in Face::ALL {
            let [a, b, c, d] = face.corners();
            let n = face.normal();
            assert!((b - a).cross(c - a).dot(n) > 0.0, "{face:?} first triangle");
            assert!((c - a).cross(d - a).dot(n) > 0.0, "{face:?} second triangle");
        }
    }

    #[test]
    fn corners_lie_on_the_face_plane() {
        for face in Face::ALL {
            let n = face.normal();
            let plane = if n.dot(Vec3::ONE) > 0.0 { 1.0 } else { 0.0 };
            for p in face.corners() {
                assert_eq!(p.dot(n).abs(), plane, "{face:?}");
            }
        }
    }
}
