mod common;

use rand::rngs::StdRng;
use rand::SeedableRng;
use student::{EnvConfig, EnvShape, StudentEnv};

fn trajectory(seed: u64) -> Vec<(f32, bool)> {
    let shape = EnvShape::new(2, 3, 3);
    let mut env = StudentEnv::with_seed(shape, seed).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    env.reset();
    (0..300)
        .map(|_| {
            let step = env.step(common::random_action(shape, &mut rng)).unwrap();
            (step.reward, step.done)
        })
        .collect()
}

#[test]
fn same_seed_same_trajectory() {
    assert_eq!(trajectory(3), trajectory(3));
}

#[test]
fn different_seeds_diverge() {
    let a = StudentEnv::with_seed(EnvShape::new(3, 3, 3), 1).unwrap();
    let b = StudentEnv::with_seed(EnvShape::new(3, 3, 3), 2).unwrap();
    assert_ne!(a.skills(), b.skills());
}

#[test]
fn config_loaded_from_json_replays_the_default_trajectory() -> anyhow::Result<()> {
    let shape = EnvShape::new(2, 3, 3);
    let json = serde_json::to_string(&EnvConfig::default())?;
    let config = EnvConfig::from_json_str(&json)?;
    let mut loaded = StudentEnv::with_config(shape, config, StdRng::seed_from_u64(11))?;
    let mut default = StudentEnv::with_seed(shape, 11)?;
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..100 {
        let action = common::random_action(shape, &mut rng);
        assert_eq!(loaded.step(action)?.reward, default.step(action)?.reward);
    }
    Ok(())
}
