#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use burn::config::Config;

    use crate::config::{ConvKind, ModelConfig, StageLayout, Upsampling, Variant};
    use crate::error::UNetError;
    use crate::models::UNetConfig;
    use burn::backend::{ndarray::NdArrayDevice, NdArray};

    #[test]
    fn test_default_configuration_is_valid() {
        let config = ModelConfig::new();

        assert_eq!(config.in_channels, 12);
        assert_eq!(config.out_channels, 1);
        assert_eq!(config.variant, Variant::DsAttention);
        assert_eq!(config.upsampling, Upsampling::Bilinear);
        assert_eq!(config.reduction_ratio, 16);
        assert_eq!(config.kernels_per_layer, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_every_named_variant_is_valid_at_default_width() {
        for variant in Variant::ALL {
            for upsampling in [Upsampling::Bilinear, Upsampling::Transposed] {
                let config = ModelConfig::new()
                    .with_variant(variant.clone())
                    .with_upsampling(upsampling);
                assert!(config.validate().is_ok(), "{}", variant.name());
            }
        }
    }

    #[test]
    fn test_zero_channels_error() {
        let config = ModelConfig::new().with_in_channels(0);

        match config.validate() {
            Err(UNetError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("in_channels must be greater than 0"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }
    }

    #[test]
    fn test_odd_base_width_with_bilinear_error() {
        let config = ModelConfig::new()
            .with_base_channels(7)
            .with_variant(Variant::Ds);

        match config.validate() {
            Err(UNetError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("upsampling factor"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }

        // No halving on the transposed path
        assert!(config.with_upsampling(Upsampling::Transposed).validate().is_ok());
    }

    #[test]
    fn test_zero_kernels_per_layer_error() {
        let config = ModelConfig::new()
            .with_variant(Variant::Ds)
            .with_kernels_per_layer(0);

        match config.validate() {
            Err(UNetError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("kernels_per_layer"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }

        // Ignored by standard convolutions
        assert!(config.with_variant(Variant::Base).validate().is_ok());
    }

    #[test]
    fn test_reduction_ratio_must_divide_gated_width() {
        let config = ModelConfig::new()
            .with_base_channels(8)
            .with_reduction_ratio(16)
            .with_variant(Variant::Attention);

        match config.validate() {
            Err(UNetError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("smallest gated width (8)"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }

        // Ungated variants never build a CBAM
        assert!(config.with_variant(Variant::Ds).validate().is_ok());
    }

    #[test]
    fn test_zero_reduction_ratio_error() {
        let config = ModelConfig::new().with_reduction_ratio(0);

        let result = config.validate();
        assert!(result.is_err());
        match result.unwrap_err() {
            UNetError::InvalidConfiguration { reason } => {
                assert!(reason.contains("reduction_ratio must be greater than 0"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }
    }

    #[test]
    fn test_bottleneck_only_gate_uses_bottleneck_width() {
        let layout = StageLayout::new(ConvKind::Separable, false, true, false);
        let config = ModelConfig::new()
            .with_base_channels(8)
            .with_reduction_ratio(64)
            .with_variant(Variant::Custom(layout));

        // Bottleneck width is 8 * 16 / 2 = 64
        assert_eq!(config.smallest_gated_width(), Some(64));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_lstm_with_standard_convolutions_error() {
        let layout = StageLayout::new(ConvKind::Standard, true, true, true);
        let config = ModelConfig::new().with_variant(Variant::Custom(layout));

        match config.validate() {
            Err(UNetError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("requires separable convolutions"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }
    }

    #[test]
    fn test_zero_lstm_hidden_error() {
        let config = ModelConfig::new()
            .with_variant(Variant::DsLstmAttention)
            .with_lstm_hidden(0);

        match config.validate() {
            Err(UNetError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("lstm_hidden"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }
    }

    #[test]
    fn test_init_rejects_invalid_configuration() {
        let device = NdArrayDevice::default();
        let config = ModelConfig::new().with_out_channels(0);

        match UNetConfig::new(config).init::<NdArray>(&device) {
            Err(UNetError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("out_channels"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }
    }

    #[test]
    fn test_channel_schedule() {
        let bilinear = ModelConfig::new();
        assert_eq!(bilinear.factor(), 2);
        assert_eq!(bilinear.channel_schedule(), [64, 128, 256, 512, 512]);
        assert_eq!(
            bilinear.decoder_channels(),
            [(1024, 256), (512, 128), (256, 64), (128, 64)]
        );

        let transposed = ModelConfig::new().with_upsampling(Upsampling::Transposed);
        assert_eq!(transposed.factor(), 1);
        assert_eq!(transposed.channel_schedule(), [64, 128, 256, 512, 1024]);
        assert_eq!(
            transposed.decoder_channels(),
            [(1024, 512), (512, 256), (256, 128), (128, 64)]
        );
    }

    #[test]
    fn test_variant_layouts() {
        let layout = Variant::DsAttention4Cbams.layout();
        assert_eq!(layout.conv, ConvKind::Separable);
        assert!(layout.skip_gates);
        assert!(!layout.bottleneck_gate);
        assert!(!layout.bottleneck_lstm);

        assert!(!Variant::Base.layout().has_gates());
        assert!(Variant::Attention.layout().has_gates());
        assert_eq!(Variant::Attention.layout().conv, ConvKind::Standard);
    }

    #[test]
    fn test_variant_from_str() {
        for variant in Variant::ALL {
            assert_eq!(Variant::from_str(variant.name()).unwrap(), variant);
        }

        assert_eq!(Variant::from_str("ds_attention").unwrap(), Variant::DsAttention);
        assert_eq!(Variant::from_str("ds-lstm-attention").unwrap(), Variant::DsLstmAttention);
        assert_eq!(Variant::from_str("SmaAt").unwrap(), Variant::DsAttention);
    }

    #[test]
    fn test_unknown_variant_error() {
        match Variant::from_str("resnet") {
            Err(UNetError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("Unknown variant: resnet"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }
    }

    #[test]
    fn test_configuration_json_round_trip() {
        let config = ModelConfig::new()
            .with_in_channels(6)
            .with_variant(Variant::Custom(StageLayout::new(
                ConvKind::Separable,
                true,
                false,
                true,
            )));

        let json = config.to_string();
        let restored = ModelConfig::load_binary(json.as_bytes()).unwrap();

        assert_eq!(restored.in_channels, 6);
        assert_eq!(restored.variant, config.variant);
    }
}
