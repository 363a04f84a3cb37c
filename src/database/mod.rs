mod table;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

pub use table::Table;

use crate::{
    libs::{cache, time::TIME},
    model::{Order, Product, Role, Sale, TokenStamp, User},
    Response,
};

pub type DB = Arc<Database>;

/// 所有数据文件
#[derive(Debug)]
pub struct Database {
    dir: PathBuf,
    pub sales: Table<Sale>,
    pub products: Table<Product>,
    pub orders: Table<Order>,
    pub users: Table<User>,
    /// 吊销时间落盘，重启后旧 token 仍然无效
    pub tokens: Table<TokenStamp>,
}

impl Database {
    pub const DEFAULT_ADMIN_EMAIL: &'static str = "admin@admin.com";
    pub const DEFAULT_ADMIN_PASSWORD: &'static str = "admin";

    /// 打开数据目录，没有任何用户时创建默认管理员
    pub async fn open(dir: impl AsRef<Path>) -> Result<Database, Response> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        let db = Database {
            sales: Table::load(&dir)?,
            products: Table::load(&dir)?,
            orders: Table::load(&dir)?,
            users: Table::load(&dir)?,
            tokens: Table::load(&dir)?,
            dir,
        };
        for stamp in db.tokens.all().await {
            cache::restore(&stamp.id, stamp.tbn);
        }
        if db.users.is_empty().await {
            db.users
                .insert(User {
                    id: String::new(),
                    name: "Administrador".to_owned(),
                    email: Self::DEFAULT_ADMIN_EMAIL.to_owned(),
                    password: Self::DEFAULT_ADMIN_PASSWORD.to_owned(),
                    role: Role::Admin,
                    active: true,
                    registered: TIME::now().date(),
                })
                .await?;
            tracing::warn!(
                "没有任何用户，已创建默认管理员 {}，请尽快修改密码",
                Self::DEFAULT_ADMIN_EMAIL
            );
        }
        crate::log!("数据目录 {}", db.dir.display());
        Ok(db)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 令该用户此前签发的 token 全部失效，先写缓存再落盘
    pub async fn revoke_tokens(&self, user_id: &str) -> Result<i64, Response> {
        let tbn = cache::revoke_tokens(user_id, TIME::now().millis());
        let stamp = TokenStamp {
            id: user_id.to_owned(),
            tbn,
        };
        self.tokens.upsert(stamp).await?;
        Ok(tbn)
    }
}
