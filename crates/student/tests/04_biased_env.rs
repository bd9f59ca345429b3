use student::{Action, BiasConfig, BiasedTrainingEnv, EnvShape, StudentEnv};

#[test]
fn training_types_follow_the_bias_distribution() {
    let base = StudentEnv::with_seed(EnvShape::new(2, 3, 3), 21).unwrap();
    let mut env = BiasedTrainingEnv::from_env(&base, &BiasConfig::default(), 2024).unwrap();
    let draws = 10_000;
    let mut counts = [0usize; 3];
    for i in 0..draws {
        // the requested type is always 1 and must be ignored
        let step = env.step(Action::train(i % 2, 1, 0)).unwrap();
        counts[step.info.learning_type.unwrap()] += 1;
    }

    let expected = [0.8, 0.1, 0.1].map(|p| p * draws as f64);
    let chi_square: f64 = counts
        .iter()
        .zip(expected)
        .map(|(&observed, e)| (observed as f64 - e).powi(2) / e)
        .sum();
    // two degrees of freedom, 95th percentile
    assert!(chi_square < 5.991, "counts {counts:?}, chi-square {chi_square}");
}

#[test]
fn test_path_matches_the_base_environment() {
    let mut base = StudentEnv::with_seed(EnvShape::new(2, 3, 3), 31).unwrap();
    for _ in 0..4 {
        base.step(Action::train(0, 0, 0)).unwrap();
    }
    let mut biased = BiasedTrainingEnv::from_env(&base, &BiasConfig::default(), 5).unwrap();

    for action in [Action::test(0, 0), Action::test(1, 2), Action::test(0, 1)] {
        let expected = base.step(action).unwrap();
        let got = biased.step(action).unwrap();
        assert_eq!(got.reward.to_bits(), expected.reward.to_bits());
        assert_eq!(got.done, expected.done);
        assert_eq!(got.info, expected.info);
        assert_eq!(got.observation, expected.observation);
    }
    assert_eq!(biased.inner().skills(), base.skills());
}

#[test]
fn copying_leaves_the_source_untouched() {
    let mut base = StudentEnv::with_seed(EnvShape::new(2, 3, 3), 41).unwrap();
    base.step(Action::train(1, 2, 0)).unwrap();
    let snapshot = base.clone();
    let mut biased = BiasedTrainingEnv::from_env(&base, &BiasConfig::default(), 6).unwrap();
    assert_eq!(biased.inner().episode(), base.episode());
    assert_eq!(biased.inner().step_num(), 1);
    assert_eq!(biased.inner().cumulative_train_time(), base.cumulative_train_time());
    assert_eq!(biased.inner().gain_profile(), base.gain_profile());

    biased.step(Action::train(1, 0, 0)).unwrap();
    biased.reset();
    assert_eq!(base.scores(), snapshot.scores());
    assert_eq!(base.step_num(), snapshot.step_num());
    assert_eq!(base.episode(), 0);
    assert_eq!(biased.inner().episode(), 1);
}
