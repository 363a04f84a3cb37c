//! 业务数据：销售、商品、订单、用户。
//!
//! 各实体之间没有外键约束，销售记录里的 `seller` 只是名字。

mod order;
mod product;
mod sale;
mod token;
mod user;

use chrono::NaiveDateTime;
use serde::{de::DeserializeOwned, Serialize};

pub use order::{Order, OrderStatus};
pub use product::{sale_price, Product};
pub use sale::{PaymentMethod, Sale, SaleItem};
pub use token::TokenStamp;
pub use user::{Role, User, UserInfo, UserUpdate};

/// 存放在单个 JSON 文件中的一类记录
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// 文件名和 URL 路径
    const RESOURCE: &'static str;
    /// 编号前缀
    const PREFIX: &'static str;
    /// 日志和提示里使用的名称
    const NAME: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

pub(crate) fn now() -> NaiveDateTime {
    crate::libs::time::TIME::now().naive()
}
