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

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
}

impl std::str::FromStr for OrderStatus {
    type Err = Response;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            _ => Err(Response::invalid_value(format!("未知的订单状态 {s}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    #[serde(default)]
    pub id: String,
    pub customer: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(deserialize_with = "deser_f64")]
    pub amount: f64,
    #[serde(default)]
    pub detail: String,
    #[serde(default = "now")]
    #[serde(deserialize_with = "deser_timestamp")]
    #[serde(serialize_with = "serialize_timestamp")]
    pub date: NaiveDateTime,
}

impl Record for Order {
    const RESOURCE: &'static str = "orders";
    const PREFIX: &'static str = "O";
    const NAME: &'static str = "订单";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Order {
    pub fn validate(&self) -> Result<(), Response> {
        required("customer", &self.customer)?;
        required("address", &self.address)?;
        positive("amount", self.amount)
    }
    pub fn normalize(&mut self) {
        self.amount = round2(self.amount);
    }
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }
}
