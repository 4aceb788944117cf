#![cfg(test)]

use rustfft::FftPlanner;

use super::error::SolverError;
use super::field::{Real, PI};
use super::transform::dst::{DstAlgorithm, DstKernel};
use super::transform::{PlanFlags, SineTransformPlan, TransformKind, WisdomCache};

const TOL: Real = if cfg!(feature = "single-precision") {
    1e-3
} else {
    1e-9
};

fn reference_dst(input: &[Real]) -> Vec<Real> {
    let n = input.len();
    (0..n)
        .map(|k| {
            2.0 * input
                .iter()
                .enumerate()
                .map(|(j, &x)| x * (PI * ((j + 1) * (k + 1)) as Real / (n + 1) as Real).sin())
                .sum::<Real>()
        })
        .collect()
}

fn signal(len: usize, seed: usize) -> Vec<Real> {
    (0..len)
        .map(|j| ((j * 37 + seed * 11 + 5) % 23) as Real / 23.0 - 0.5)
        .collect()
}

fn assert_close(actual: &[Real], expected: &[Real], tol: Real) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tol * (1.0 + e.abs()),
            "mismatch at {i}: {a} vs {e}"
        );
    }
}

#[test]
fn both_kernels_match_the_defining_sum() {
    let mut planner = FftPlanner::<Real>::new();
    for len in [1, 2, 3, 7, 16, 31, 64] {
        let input = signal(len, len);
        let expected = reference_dst(&input);
        for algorithm in [DstAlgorithm::OddExtension, DstAlgorithm::Direct] {
            let kernel = DstKernel::new(len, algorithm, &mut planner);
            let mut work = kernel.work();
            let mut output = vec![0.0; len];
            kernel.apply(&input, &mut output, &mut work);
            assert_close(&output, &expected, TOL);
        }
    }
}

#[test]
fn applying_twice_scales_by_two_n_plus_two() {
    for len in [1, 5, 12, 100] {
        let mut plan =
            SineTransformPlan::create(len, PlanFlags::ESTIMATE, &WisdomCache::in_memory())
                .unwrap();
        let input = signal(len, 3);
        let mut spectrum = vec![0.0; len];
        let mut back = vec![0.0; len];
        plan.forward(&input, &mut spectrum);
        plan.inverse(&spectrum, &mut back);
        let scale = 1.0 / (2 * (len + 1)) as Real;
        back.iter_mut().for_each(|v| *v *= scale);
        assert_close(&back, &input, TOL);
    }
}

#[test]
fn in_place_matches_out_of_place() {
    let len = 24;
    let mut plan =
        SineTransformPlan::create(len, PlanFlags::ESTIMATE, &WisdomCache::in_memory()).unwrap();
    let input = signal(len, 9);
    let mut expected = vec![0.0; len];
    plan.forward(&input, &mut expected);

    let mut data = input.clone();
    plan.forward_in_place(&mut data);
    assert_close(&data, &expected, TOL);
}

#[test]
fn batched_plan_honours_distances() {
    let (len, howmany, idist, odist) = (6, 4, 9, 7);
    let mut plan = SineTransformPlan::create_batched(
        len,
        howmany,
        idist,
        odist,
        PlanFlags::ESTIMATE,
        1,
        &WisdomCache::in_memory(),
    )
    .unwrap();
    assert_eq!(plan.distances(), (idist, odist));
    assert_eq!(plan.kind(), TransformKind::Rodft00);

    let input = signal(howmany * idist, 1);
    let mut output = vec![Real::NAN; howmany * odist];
    plan.forward(&input, &mut output);

    for b in 0..howmany {
        let expected = reference_dst(&input[b * idist..b * idist + len]);
        assert_close(&output[b * odist..b * odist + len], &expected, TOL);
        // Gaps between transforms are left untouched.
        assert!(output[b * odist + len..(b + 1) * odist]
            .iter()
            .all(|v| v.is_nan()));
    }
}

#[test]
fn threaded_batch_matches_sequential_batch() {
    let (len, howmany) = (33, 40);
    let wisdom = WisdomCache::in_memory();
    let mut serial = SineTransformPlan::create_batched(
        len,
        howmany,
        len,
        len,
        PlanFlags::ESTIMATE,
        1,
        &wisdom,
    )
    .unwrap();
    let mut threaded = SineTransformPlan::create_batched(
        len,
        howmany,
        len,
        len,
        PlanFlags::ESTIMATE,
        4,
        &wisdom,
    )
    .unwrap();

    let input = signal(len * howmany, 2);
    let mut a = vec![0.0; input.len()];
    let mut b = vec![0.0; input.len()];
    serial.forward(&input, &mut a);
    threaded.forward(&input, &mut b);
    assert_eq!(a, b);

    let mut c = input.clone();
    threaded.forward_in_place(&mut c);
    assert_eq!(a, c);
}

#[test]
fn invalid_geometry_is_a_plan_failure() {
    let wisdom = WisdomCache::in_memory();
    let cases = [
        (0, 1, 0, 0),
        (4, 0, 4, 4),
        (4, 2, 3, 4),
        (4, 2, 4, 3),
    ];
    for (len, howmany, idist, odist) in cases {
        let err = SineTransformPlan::create_batched(
            len,
            howmany,
            idist,
            odist,
            PlanFlags::ESTIMATE,
            1,
            &wisdom,
        )
        .err()
        .expect("plan should fail");
        assert!(
            matches!(err, SolverError::PlanCreationFailure { len: l, howmany: h, .. } if l == len && h == howmany),
            "unexpected error {err:?}"
        );
    }
}

#[test]
fn flops_follow_n_log_n() {
    let wisdom = WisdomCache::in_memory();
    let single = SineTransformPlan::create(64, PlanFlags::ESTIMATE, &wisdom).unwrap();
    assert!((single.flops() - 2.5 * 64.0 * 6.0).abs() < 1e-9);

    let batch =
        SineTransformPlan::create_batched(64, 10, 64, 64, PlanFlags::ESTIMATE, 1, &wisdom)
            .unwrap();
    assert!((batch.flops() - 10.0 * single.flops()).abs() < 1e-9);

    let trivial = SineTransformPlan::create(1, PlanFlags::ESTIMATE, &wisdom).unwrap();
    assert_eq!(trivial.flops(), 0.0);
}

#[test]
fn estimate_prefers_direct_kernel_for_tiny_lengths() {
    let wisdom = WisdomCache::in_memory();
    let tiny = SineTransformPlan::create(4, PlanFlags::ESTIMATE, &wisdom).unwrap();
    let large = SineTransformPlan::create(512, PlanFlags::ESTIMATE, &wisdom).unwrap();
    assert_eq!(tiny.algorithm(), DstAlgorithm::Direct);
    assert_eq!(large.algorithm(), DstAlgorithm::OddExtension);
    assert!(!tiny.planned_from_wisdom());
    tiny.dispose();
    large.dispose();
}
