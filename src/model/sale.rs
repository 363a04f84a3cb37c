use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    libs::{
        dser::{deser_f64, deser_timestamp, serialize_timestamp},
        round2,
        validate::{positive, required},
    },
    Response,
};

use super::{now, Record};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [Self::Cash, Self::Card, Self::Transfer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Transfer => "transfer",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = Response;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Response::invalid_value(format!("未知的付款方式 {s}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleItem {
    #[serde(default)]
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    #[serde(deserialize_with = "deser_f64")]
    pub unit_price: f64,
}

impl SaleItem {
    pub fn subtotal(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sale {
    #[serde(default)]
    pub id: String,
    #[serde(default = "now")]
    #[serde(deserialize_with = "deser_timestamp")]
    #[serde(serialize_with = "serialize_timestamp")]
    pub date: NaiveDateTime,
    #[serde(default)]
    pub seller: String,
    #[serde(default, deserialize_with = "deser_f64")]
    pub amount: f64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub items: Vec<SaleItem>,
}

impl Record for Sale {
    const RESOURCE: &'static str = "sales";
    const PREFIX: &'static str = "V";
    const NAME: &'static str = "销售记录";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Sale {
    pub fn items_total(&self) -> f64 {
        round2(self.items.iter().map(SaleItem::subtotal).sum())
    }
    /// 有明细但没填金额时，金额取明细合计
    pub fn normalize(&mut self) {
        if self.amount == 0.0 && !self.items.is_empty() {
            self.amount = self.items_total();
        }
        self.amount = round2(self.amount);
        self.seller = self.seller.trim().to_owned();
    }
    pub fn validate(&self) -> Result<(), Response> {
        required("seller", &self.seller)?;
        positive("amount", self.amount)?;
        for item in &self.items {
            required("items.name", &item.name)?;
            if item.quantity == 0 {
                return Err(Response::invalid_value("items.quantity 至少为1"));
            }
            if !item.unit_price.is_finite() || item.unit_price < 0.0 {
                return Err(Response::invalid_value("items.unit_price 不能为负"));
            }
        }
        Ok(())
    }
}
