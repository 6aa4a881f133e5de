use ndarray::{array, Array1};
use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::policy::{argmax, epsilon_greedy, EpsilonDecay};

#[test]
fn test_argmax_first_index_wins_ties() {
    assert_eq!(argmax(array![1.0f32, 3.0, 3.0, 2.0].view()), Some(1));
    assert_eq!(argmax(array![0.0f32, 0.0].view()), Some(0));
    assert_eq!(argmax(array![-5.0f32].view()), Some(0));
}

#[test]
fn test_argmax_skips_nan() {
    assert_eq!(argmax(array![f32::NAN, 1.0, 0.5].view()), Some(1));
    assert_eq!(argmax(array![0.5f32, f32::NAN, 1.0].view()), Some(2));
}

#[test]
fn test_argmax_empty() {
    assert_eq!(argmax(Array1::<f32>::zeros(0).view()), None);
}

#[test]
fn test_greedy_with_zero_epsilon() {
    let mut rng = StdRng::seed_from_u64(0);
    let values = array![0.1f32, 0.7, 0.3];
    for _ in 0..200 {
        assert_eq!(epsilon_greedy(values.view(), 0.0, &mut rng).unwrap(), 1);
    }
}

#[test]
fn test_full_exploration_reaches_every_action() {
    let mut rng = StdRng::seed_from_u64(1);
    let values = array![0.1f32, 0.7, 0.3];
    let mut counts = [0usize; 3];
    for _ in 0..600 {
        counts[epsilon_greedy(values.view(), 1.0, &mut rng).unwrap()] += 1;
    }
    assert!(counts.iter().all(|&c| c > 100), "counts: {:?}", counts);
}

#[test]
fn test_epsilon_greedy_needs_values() {
    let mut rng = StdRng::seed_from_u64(2);
    assert!(epsilon_greedy(Array1::<f32>::zeros(0).view(), 0.5, &mut rng).is_err());
}

#[test]
fn test_clamped_decay_never_moves_below_one() {
    let decay = EpsilonDecay::Clamped;
    assert_eq!(decay.next(1.0), 1.0);
    assert_eq!(decay.next(0.5), 1.0);

    let mut epsilon = 1.0;
    for _ in 0..100 {
        epsilon = decay.next(epsilon);
    }
    assert_eq!(epsilon, 1.0);
    assert_eq!(EpsilonDecay::default(), EpsilonDecay::Clamped);
}

#[test]
fn test_geometric_decay_reaches_floor() {
    let decay = EpsilonDecay::Geometric { factor: 0.1, floor: 0.01 };
    assert!((decay.next(1.0) - 0.1).abs() < 1e-7);
    assert!((decay.next(0.1) - 0.01).abs() < 1e-7);
    assert_eq!(decay.next(0.05), 0.01);
    assert_eq!(decay.next(0.01), 0.01);
}

#[test]
fn test_decay_validation() {
    assert!(EpsilonDecay::Clamped.validate().is_ok());
    assert!(EpsilonDecay::Geometric { factor: 0.99, floor: 0.05 }.validate().is_ok());
    assert!(EpsilonDecay::Geometric { factor: 0.0, floor: 0.05 }.validate().is_err());
    assert!(EpsilonDecay::Geometric { factor: 1.5, floor: 0.05 }.validate().is_err());
    assert!(EpsilonDecay::Geometric { factor: 0.9, floor: -0.1 }.validate().is_err());
}
