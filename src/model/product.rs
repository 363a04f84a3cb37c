use serde::{Deserialize, Serialize};

use crate::{
    libs::{
        dser::deser_f64,
        round2,
        validate::{in_range, required},
    },
    Response,
};

use super::Record;

/// 按毛利率计算售价：进价 * (1 + 毛利率%)
pub fn sale_price(purchase: f64, margin: f64) -> f64 {
    round2(purchase * (1.0 + margin / 100.0))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// 进价
    #[serde(deserialize_with = "deser_f64")]
    pub purchase_price: f64,
    /// 毛利率，百分比
    #[serde(deserialize_with = "deser_f64")]
    pub margin: f64,
    #[serde(default, deserialize_with = "deser_f64")]
    pub sale_price: f64,
    #[serde(default)]
    pub stock: u32,
}

impl Record for Product {
    const RESOURCE: &'static str = "products";
    const PREFIX: &'static str = "P";
    const NAME: &'static str = "商品";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Product {
    /// 售价总是由进价和毛利率重新计算
    pub fn reprice(&mut self) {
        self.purchase_price = round2(self.purchase_price);
        self.sale_price = sale_price(self.purchase_price, self.margin);
    }
    pub fn validate(&self) -> Result<(), Response> {
        required("name", &self.name)?;
        required("category", &self.category)?;
        in_range("purchase_price", self.purchase_price, 0.0, f64::MAX)?;
        in_range("margin", self.margin, 0.0, 1000.0)?;
        Ok(())
    }
    /// 调整库存，不会低于0；返回是否发生了截断
    pub fn adjust_stock(&mut self, delta: i64) -> bool {
        let next = (self.stock as i64).saturating_add(delta);
        self.stock = next.clamp(0, u32::MAX as i64) as u32;
        next < 0
    }
    pub fn profit(&self) -> f64 {
        round2(self.sale_price - self.purchase_price)
    }
}
