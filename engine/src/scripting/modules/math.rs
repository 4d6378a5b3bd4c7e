//! Math types and functions for Rhai scripts

use glam::Vec2;
use rhai::Engine;
use tracing::debug;

/// Register math types with Rhai
pub fn register_math_types(engine: &mut Engine) {
    debug!("Registering math types");

    engine
        .register_type_with_name::<Vec2>("Vec2")
        .register_fn("Vec2", |x: f64, y: f64| Vec2::new(x as f32, y as f32))
        .register_fn("Vec2", |x: i64, y: i64| Vec2::new(x as f32, y as f32))
        .register_fn("Vec2", || Vec2::ZERO)
        .register_get("x", |v: &mut Vec2| v.x as f64)
        .register_set("x", |v: &mut Vec2, x: f64| v.x = x as f32)
        .register_set("x", |v: &mut Vec2, x: i64| v.x = x as f32)
        .register_get("y", |v: &mut Vec2| v.y as f64)
        .register_set("y", |v: &mut Vec2, y: f64| v.y = y as f32)
        .register_set("y", |v: &mut Vec2, y: i64| v.y = y as f32)
        .register_fn("+", |a: Vec2, b: Vec2| a + b)
        .register_fn("-", |a: Vec2, b: Vec2| a - b)
        .register_fn("-", |a: Vec2| -a)
        .register_fn("*", |a: Vec2, b: f64| a * b as f32)
        .register_fn("*", |a: f64, b: Vec2| b * a as f32)
        .register_fn("/", |a: Vec2, b: f64| a / b as f32)
        .register_fn("==", |a: &mut Vec2, b: Vec2| *a == b)
        .register_fn("!=", |a: &mut Vec2, b: Vec2| *a != b)
        .register_fn("length", |v: &mut Vec2| v.length() as f64)
        .register_fn("normalize", |v: &mut Vec2| v.normalize_or_zero())
        .register_fn("dot", |a: &mut Vec2, b: Vec2| a.dot(b) as f64)
        .register_fn("distance", |a: &mut Vec2, b: Vec2| a.distance(b) as f64)
        .register_fn("lerp", |a: &mut Vec2, b: Vec2, t: f64| a.lerp(b, t as f32))
        .register_fn("to_string", |v: &mut Vec2| format!("Vec2({}, {})", v.x, v.y))
        .register_fn("to_debug", |v: &mut Vec2| format!("Vec2({}, {})", v.x, v.y));

    engine
        .register_fn("clamp", |v: f64, min: f64, max: f64| v.clamp(min, max))
        .register_fn("lerp", |a: f64, b: f64, t: f64| a + (b - a) * t);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        let mut engine = Engine::new();
        register_math_types(&mut engine);
        engine
    }

    #[test]
    fn test_vec2_construction_and_fields() {
        let engine = engine();
        let v: Vec2 = engine.eval("let v = Vec2(1, 2); v.x = 4.5; v").unwrap();
        assert_eq!(v, Vec2::new(4.5, 2.0));
    }

    #[test]
    fn test_vec2_operators() {
        let engine = engine();
        let v: Vec2 = engine
            .eval("(Vec2(1.0, 2.0) + Vec2(3.0, 4.0)) * 2.0 - Vec2(1.0, 1.0)")
            .unwrap();
        assert_eq!(v, Vec2::new(7.0, 11.0));

        let len: f64 = engine.eval("Vec2(3.0, 4.0).length()").unwrap();
        assert_eq!(len, 5.0);

        let same: bool = engine.eval("Vec2(1, 1) == Vec2(1.0, 1.0)").unwrap();
        assert!(same);
    }

    #[test]
    fn test_vec2_to_string() {
        let engine = engine();
        let text: String = engine.eval("`${Vec2(1.5, -2.0)}`").unwrap();
        assert_eq!(text, "Vec2(1.5, -2)");
    }
}
