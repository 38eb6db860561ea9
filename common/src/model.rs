//! 地域判別モデルの定義

use serde::{Deserialize, Serialize};

/// バックエンドが提供するモデル（クエリパラメータ `model`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelVariant {
    #[serde(rename = "resnet18_tea_region")]
    ResNet18,
    #[serde(rename = "resnet4_tea_region")]
    ResNet4,
    #[serde(rename = "squeezenet_tea_region")]
    SqueezeNet,
    #[serde(rename = "mobilenetv2_tea_region")]
    MobileNetV2,
    #[serde(rename = "efficientnetb0_tea_region")]
    EfficientNetB0,
    #[serde(rename = "shufflenetv2_tea_region")]
    ShuffleNetV2,
}

impl ModelVariant {
    /// 比較画面の列順
    pub const ALL: [ModelVariant; 6] = [
        ModelVariant::ResNet18,
        ModelVariant::ResNet4,
        ModelVariant::SqueezeNet,
        ModelVariant::MobileNetV2,
        ModelVariant::EfficientNetB0,
        ModelVariant::ShuffleNetV2,
    ];

    pub fn model_name(&self) -> &'static str {
        match self {
            ModelVariant::ResNet18 => "resnet18_tea_region",
            ModelVariant::ResNet4 => "resnet4_tea_region",
            ModelVariant::SqueezeNet => "squeezenet_tea_region",
            ModelVariant::MobileNetV2 => "mobilenetv2_tea_region",
            ModelVariant::EfficientNetB0 => "efficientnetb0_tea_region",
            ModelVariant::ShuffleNetV2 => "shufflenetv2_tea_region",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelVariant::ResNet18 => "ResNet18",
            ModelVariant::ResNet4 => "ResNet4",
            ModelVariant::SqueezeNet => "SqueezeNet",
            ModelVariant::MobileNetV2 => "MobileNetV2",
            ModelVariant::EfficientNetB0 => "EfficientNetB0",
            ModelVariant::ShuffleNetV2 => "ShuffleNetV2",
        }
    }
}

impl std::str::FromStr for ModelVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ModelVariant::ALL
            .iter()
            .copied()
            .find(|m| m.model_name() == lower || m.label().to_lowercase() == lower)
            .ok_or_else(|| {
                format!(
                    "Unknown model: {}. Use one of {}",
                    s,
                    ModelVariant::ALL
                        .iter()
                        .map(|m| m.label())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

impl std::fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.model_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_by_name_and_label() {
        assert_eq!("resnet18_tea_region".parse::<ModelVariant>().unwrap(), ModelVariant::ResNet18);
        assert_eq!("MobileNetV2".parse::<ModelVariant>().unwrap(), ModelVariant::MobileNetV2);
        let err = "vgg16".parse::<ModelVariant>().unwrap_err();
        assert!(err.contains("ShuffleNetV2"));
    }

    #[test]
    fn test_serde_uses_model_name() {
        let json = serde_json::to_string(&ModelVariant::EfficientNetB0).unwrap();
        assert_eq!(json, "\"efficientnetb0_tea_region\"");
    }
}
