use bevy::math::Vec3;
use bevy_log::info;
use rand::Rng;
use ron::de::from_str;
use ron::ser::PrettyConfig;
use serde::Serialize;
use sim::{BallSpec, SceneConfig, SimulationSnapshot};
use std::fs;
use std::{fs::File, io::Write, path::Path};

const BALL_MATERIALS: [&str; 5] = ["gray", "white", "green", "red", "blue"];

pub fn load_scene(path: &Path) -> Result<SceneConfig, Box<dyn std::error::Error>> {
    let contents: String = fs::read_to_string(path)?;
    let scene: SceneConfig = from_str(&contents)?;
    scene.validate()?;

    info!(
        "Loaded scene from {} with {} balls",
        path.display(),
        scene.balls.len()
    );

    Ok(scene)
}

fn write_ron<T: Serialize>(value: &T, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let pretty_config = PrettyConfig::new()
        .with_depth_limit(3)
        .with_separate_tuple_members(true)
        .with_enumerate_arrays(true);

    let serialized = ron::ser::to_string_pretty(value, pretty_config)?;
    let mut file = File::create(path)?;
    file.write_all(serialized.as_bytes())?;
    Ok(())
}

pub fn save_scene(scene: &SceneConfig, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    write_ron(scene, path)?;
    info!("Scene saved to {}", path.display());
    Ok(())
}

pub fn save_snapshot(
    snapshot: &SimulationSnapshot,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    write_ron(snapshot, path)?;
    info!("Snapshot of tick {} saved to {}", snapshot.tick, path.display());
    Ok(())
}

/// Random balls dropped from above the water, inside the tank walls.
pub fn scatter_balls(rng: &mut impl Rng, count: usize, scene: &SceneConfig) -> Vec<BallSpec> {
    (0..count)
        .map(|i| {
            let radius = rng.gen_range(0.1..0.3);
            let density = rng.gen_range(0.2..2.0);
            let (max_x, max_z) = scene.tank.wall_limits(radius);
            let drop_height = scene.water_depth + radius;

            let position = Vec3::new(
                rng.gen_range(-max_x..=max_x),
                rng.gen_range(drop_height..=drop_height + 0.5),
                rng.gen_range(-max_z..=max_z),
            );

            BallSpec::new(
                position,
                radius,
                density,
                BALL_MATERIALS[i % BALL_MATERIALS.len()],
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sim::{ScenePreset, TankSimulation};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("runner-{}-{}.ron", name, std::process::id()))
    }

    #[test]
    fn test_scene_file_round_trip() {
        let path = temp_path("scene");
        let scene = ScenePreset::ThreeBalls.to_config();

        save_scene(&scene, &path).unwrap();
        let loaded = load_scene(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded.balls.len(), 3);
        assert_eq!(loaded.balls[1].material, "white");
        assert_eq!(loaded.collision_mode, scene.collision_mode);
        assert!((loaded.column_spacing - scene.column_spacing).abs() < 1e-6);
        assert!((loaded.balls[0].position - scene.balls[0].position).length() < 1e-6);
    }

    #[test]
    fn test_load_rejects_missing_and_invalid_files() {
        assert!(load_scene(Path::new("/nonexistent/scene.ron")).is_err());

        let path = temp_path("invalid");
        fs::write(&path, "(column_spacing: -1.0)").unwrap();
        let result = load_scene(&path);
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_snapshot_is_written() {
        let path = temp_path("snapshot");
        let sim = TankSimulation::from_preset(ScenePreset::SingleBall).unwrap();

        save_snapshot(&sim.snapshot(), &path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(contents.contains("surface"));
        assert!(contents.contains("white"));
    }

    #[test]
    fn test_scattered_balls_fit_in_tank() {
        let scene = ScenePreset::Empty.to_config();
        let mut rng = StdRng::seed_from_u64(7);
        let balls = scatter_balls(&mut rng, 20, &scene);

        assert_eq!(balls.len(), 20);
        for ball in &balls {
            let (max_x, max_z) = scene.tank.wall_limits(ball.radius);
            assert!(ball.position.x.abs() <= max_x);
            assert!(ball.position.z.abs() <= max_z);
            assert!(ball.position.y - ball.radius >= scene.water_depth - 1e-6);
        }

        let again = scatter_balls(&mut StdRng::seed_from_u64(7), 20, &scene);
        assert_eq!(balls, again);

        let mut with_balls = scene.clone();
        with_balls.balls = balls;
        assert!(with_balls.validate().is_ok());
    }
}
