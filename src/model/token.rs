use serde::{Deserialize, Serialize};

use super::Record;

/// 用户的 token 吊销时间，签发时间早于 `tbn` 的 token 不可用
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenStamp {
    /// 用户id
    pub id: String,
    pub tbn: i64,
}

impl Record for TokenStamp {
    const RESOURCE: &'static str = "tokens";
    const PREFIX: &'static str = "T";
    const NAME: &'static str = "令牌";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
