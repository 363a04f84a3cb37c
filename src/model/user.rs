use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    libs::{
        dser::{deser_date, deser_empty_to_none, deserialize_any_to_bool},
        validate::{email, min_len, required},
    },
    Response,
};

use super::Record;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Seller,
    Supervisor,
}

fn active() -> bool {
    true
}
fn today() -> NaiveDate {
    crate::libs::time::TIME::now().date()
}

/// 员工账号。密码按原样保存并按原样比较
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default = "active", deserialize_with = "deserialize_any_to_bool")]
    pub active: bool,
    #[serde(default = "today", deserialize_with = "deser_date")]
    pub registered: NaiveDate,
}

impl Record for User {
    const RESOURCE: &'static str = "users";
    const PREFIX: &'static str = "U";
    const NAME: &'static str = "用户";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl User {
    pub fn validate(&self) -> Result<(), Response> {
        required("name", &self.name)?;
        email(&self.email)?;
        min_len("password", &self.password, 4)
    }
    pub fn info(&self) -> UserInfo {
        UserInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            active: self.active,
            registered: self.registered,
        }
    }
    pub fn same_email(&self, other: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(other.trim())
    }
}

/// 对外展示的用户数据，不含密码
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub registered: NaiveDate,
}

/// 修改用户时提交的数据，未提交的字段保持原值
#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl UserUpdate {
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password) = self.password {
            user.password = password;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(active) = self.active {
            user.active = active;
        }
    }
}
