use student::{Action, EnvShape, StudentEnv};

#[test]
fn reset_returns_zeroed_matrix_and_counts_episodes() {
    let mut env = StudentEnv::with_seed(EnvShape::new(2, 3, 3), 1).unwrap();
    assert_eq!(env.episode(), 0);
    for episode in 1..=3 {
        for _ in 0..5 {
            env.step(Action::train(1, 0, 0)).unwrap();
        }
        env.step(Action::test(1, 0)).unwrap();
        assert_eq!(env.step_num(), 6);

        let obs = env.reset();
        assert!(obs.as_slice().iter().all(|v| *v == 0.0));
        assert_eq!(obs.len(), 2 * 3 * 8);
        assert_eq!(env.step_num(), 0);
        assert_eq!(env.episode(), episode);
        assert!(env.cumulative_train_time().iter().all(|t| *t == 0.0));
        assert!(env.train_counter(1, 0).iter().all(|c| *c == 0.0));
        assert!(env.last_info().is_none());
    }
}

#[test]
fn reset_redraws_latent_state() {
    let mut env = StudentEnv::with_seed(EnvShape::new(4, 3, 3), 2).unwrap();
    let skills = env.skills().to_vec();
    let profile = env.gain_profile().clone();
    env.reset();
    assert_ne!(env.skills(), skills.as_slice());
    assert_ne!(env.gain_profile(), &profile);
    assert!(env.skills().iter().all(|s| (0.0..=100.0).contains(s)));
    assert_eq!(env.thresholds().len(), 3);
    assert_eq!(env.thresholds()[0], 0.0);
}

#[test]
fn zero_sized_shapes_fail_construction() {
    assert!(StudentEnv::with_seed(EnvShape::new(0, 3, 3), 0).is_err());
    assert!(StudentEnv::with_seed(EnvShape::new(1, 0, 3), 0).is_err());
    assert!(StudentEnv::with_seed(EnvShape::new(1, 3, 0), 0).is_err());
}
