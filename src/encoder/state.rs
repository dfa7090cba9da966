//! 当前结果状态槽。
//!
//! “图片或错误”用一个带标签的枚举表示，两者不可能同时存在。

use serde::{Serialize, Serializer};
use serde::ser::SerializeStruct;

use super::source::ImageInfo;
use super::EncodeError;

/// 控制器持有的唯一状态。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IntakeState {
    #[default]
    Empty,
    Ready(ImageInfo),
    Failed(EncodeError),
}

impl IntakeState {
    pub fn image_info(&self) -> Option<&ImageInfo> {
        match self {
            Self::Ready(info) => Some(info),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&EncodeError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub(crate) fn status(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

/// 前端消费的形状：`{ status, imageInfo?, error? }`。
impl Serialize for IntakeState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("IntakeState", 3)?;
        state.serialize_field("status", self.status())?;
        match self {
            Self::Empty => {
                state.skip_field("imageInfo")?;
                state.skip_field("error")?;
            }
            Self::Ready(info) => {
                state.serialize_field("imageInfo", info)?;
                state.skip_field("error")?;
            }
            Self::Failed(err) => {
                state.skip_field("imageInfo")?;
                state.serialize_field(
                    "error",
                    &serde_json::json!({
                        "code": err.code(),
                        "stage": err.stage(),
                        "message": err.to_string(),
                    }),
                )?;
            }
        }
        state.end()
    }
}
