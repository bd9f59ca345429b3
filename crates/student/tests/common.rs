use rand::rngs::StdRng;
use rand::Rng;
use student::{Action, EnvShape};

pub fn random_action(shape: EnvShape, rng: &mut StdRng) -> Action {
    let dims = shape.action_dims();
    let values: Vec<usize> = dims.iter().map(|d| rng.gen_range(0..*d)).collect();
    Action::from_slice(&values).unwrap()
}
