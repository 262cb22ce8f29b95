use stratum_geom::Vec3;

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn vec3_approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps) && approx_eq(a.z, b.z, eps)
}

#[test]
fn vec3_constants() {
    assert!(vec3_approx_eq(Vec3::ZERO, Vec3::new(0.0, 0.0, 0.0), 1e-6));
    assert!(vec3_approx_eq(Vec3::ONE, Vec3::new(1.0, 1.0, 1.0), 1e-6));
}

#[test]
fn vec3_add_sub() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(-4.0, 5.0, -6.0);
    let c = a + b;
    assert!(vec3_approx_eq(c, Vec3::new(-3.0, 7.0, -3.0), 1e-6));

    let d = c - a;
    assert!(vec3_approx_eq(d, b, 1e-6));

    let mut e = a;
    e += b;
    assert!(vec3_approx_eq(e, c, 1e-6));
}

#[test]
fn vec3_scalar_and_component_scale() {
    let v = Vec3::new(1.5, -2.0, 4.0);
    assert!(vec3_approx_eq(v * 2.0, Vec3::new(3.0, -4.0, 8.0), 1e-6));
    assert!(vec3_approx_eq((v * 2.0) / 2.0, v, 1e-6));
    assert!(vec3_approx_eq(
        v.scale(Vec3::new(2.0, 0.5, 0.25)),
        Vec3::new(3.0, -1.0, 1.0),
        1e-6
    ));
}

#[test]
fn vec3_cross_follows_right_hand_rule() {
    let x = Vec3::new(1.0, 0.0, 0.0);
    let y = Vec3::new(0.0, 1.0, 0.0);
    let z = Vec3::new(0.0, 0.0, 1.0);
    assert!(vec3_approx_eq(x.cross(y), z, 1e-6));
    assert!(vec3_approx_eq(y.cross(z), x, 1e-6));
    assert!(vec3_approx_eq(z.cross(x), y, 1e-6));
    assert!(approx_eq(x.cross(y).dot(z), 1.0, 1e-6));
}

#[test]
fn vec3_array_conversions() {
    let v = Vec3::from([1.0, 2.0, 3.0]);
    assert_eq!(v.to_array(), [1.0, 2.0, 3.0]);
}
