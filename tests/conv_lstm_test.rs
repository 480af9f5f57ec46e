#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use burn::tensor::{Distribution, Tensor};
    use convlstm::prelude::*;

    type Backend = NdArray<f32>;

    fn max_diff<const D: usize>(a: Tensor<Backend, D>, b: Tensor<Backend, D>) -> f32 {
        (a - b).abs().max().into_scalar()
    }

    #[test]
    fn test_reference_scenario() {
        let device = Default::default();
        let model = ConvLSTM::<Backend>::new(3, 4, 3, 2, &device);

        let input = Tensor::<Backend, 5>::random([2, 5, 3, 8, 8], Distribution::Default, &device);
        let (states, output) = model.forward(input, None);

        assert_eq!(output.dims(), [5, 2, 4, 8, 8]);
        assert_eq!(states.len(), 2);
        for state in states {
            assert_eq!(state.hidden.dims(), [2, 4, 8, 8]);
            assert_eq!(state.cell.dims(), [2, 4, 8, 8]);
        }
    }

    #[test]
    fn test_zero_input_zero_state_gives_zero() {
        let device = Default::default();
        let model = ConvLstmConfig::new(3, 4, 3, 1)
            .with_bias(false)
            .init::<Backend>(&device);

        let input = Tensor::<Backend, 5>::zeros([2, 1, 3, 8, 8], &device);
        let (states, output) = model.forward(input, None);

        assert_eq!(output.abs().max().into_scalar(), 0.0);
        assert_eq!(states[0].hidden.clone().abs().max().into_scalar(), 0.0);
        assert_eq!(states[0].cell.clone().abs().max().into_scalar(), 0.0);
    }

    #[test]
    fn test_spatial_size_preserved() {
        let device = Default::default();

        for filter_size in [1, 3, 5, 7] {
            for num_layers in 1..=3 {
                let model = ConvLSTM::<Backend>::new(2, 3, filter_size, num_layers, &device);
                let input = Tensor::<Backend, 5>::random(
                    [1, 2, 2, 9, 11],
                    Distribution::Default,
                    &device,
                );
                let (states, output) = model.forward(input, None);

                assert_eq!(output.dims(), [2, 1, 3, 9, 11], "filter_size={}", filter_size);
                assert_eq!(states.len(), num_layers);
                for state in states {
                    assert_eq!(state.dims(), [1, 3, 9, 11]);
                }
            }
        }
    }

    #[test]
    fn test_forward_is_deterministic() {
        let device = Default::default();
        let model = ConvLSTM::<Backend>::new(3, 4, 3, 2, &device);

        let input = Tensor::<Backend, 5>::random([2, 4, 3, 6, 6], Distribution::Default, &device);
        let initial = vec![
            ConvLstmState::new(
                Tensor::random([2, 4, 6, 6], Distribution::Default, &device),
                Tensor::random([2, 4, 6, 6], Distribution::Default, &device),
            ),
            ConvLstmState::zeros([2, 4, 6, 6], &device),
        ];

        let (states_a, out_a) = model.forward(input.clone(), Some(initial.clone()));
        let (states_b, out_b) = model.forward(input, Some(initial));

        assert_eq!(max_diff(out_a, out_b), 0.0);
        for (a, b) in states_a.into_iter().zip(states_b) {
            assert_eq!(max_diff(a.hidden, b.hidden), 0.0);
            assert_eq!(max_diff(a.cell, b.cell), 0.0);
        }
    }

    #[test]
    fn test_state_continuation_matches_full_sequence() {
        let device = Default::default();
        let model = ConvLSTM::<Backend>::new(2, 3, 3, 2, &device);

        let input = Tensor::<Backend, 5>::random([2, 6, 2, 5, 5], Distribution::Default, &device);
        let first = input.clone().narrow(1, 0, 4);
        let second = input.clone().narrow(1, 4, 2);

        let (full_states, full_output) = model.forward(input, None);

        let (mid_states, out_first) = model.forward(first, None);
        let (chunk_states, out_second) = model.forward(second, Some(mid_states));
        let chunked_output = Tensor::cat(vec![out_first, out_second], 0);

        assert!(max_diff(full_output, chunked_output) < 1e-6);
        for (full, chunked) in full_states.into_iter().zip(chunk_states) {
            assert!(max_diff(full.hidden, chunked.hidden) < 1e-6);
            assert!(max_diff(full.cell, chunked.cell) < 1e-6);
        }
    }

    #[test]
    fn test_checked_and_unchecked_forward_agree() {
        let device = Default::default();
        let model = ConvLSTM::<Backend>::new(3, 4, 5, 2, &device);

        let input = Tensor::<Backend, 5>::random([1, 3, 3, 7, 7], Distribution::Default, &device);
        let (_, unchecked) = model.forward(input.clone(), None);
        let (_, checked) = model.try_forward(input, None).unwrap();

        assert_eq!(max_diff(unchecked, checked), 0.0);
    }

    #[test]
    fn test_supplied_state_changes_output() {
        let device = Default::default();
        let model = ConvLSTM::<Backend>::new(3, 4, 3, 1, &device);

        let input = Tensor::<Backend, 5>::zeros([1, 2, 3, 6, 6], &device);
        let state = vec![ConvLstmState::new(
            Tensor::ones([1, 4, 6, 6], &device),
            Tensor::ones([1, 4, 6, 6], &device),
        )];

        let (_, from_zero) = model.forward(input.clone(), None);
        let (_, from_ones) = model.forward(input, Some(state));

        assert!(max_diff(from_zero, from_ones) > 0.0);
    }
}
