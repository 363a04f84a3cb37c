use std::path::{Path, PathBuf};

use tokio::sync::RwLock;

use crate::{libs::gen_id, model::Record, Response};

/// 一类记录对应一个 JSON 文件，整个数组读入内存。
///
/// 每次修改都先作用在副本上，写盘成功后才替换内存数据，
/// 写盘失败时内存保持原样。
#[derive(Debug)]
pub struct Table<T: Record> {
    path: PathBuf,
    rows: RwLock<Vec<T>>,
}

impl<T: Record> Table<T> {
    /// 读取 `<dir>/<resource>.json`，文件不存在时为空表
    pub fn load(dir: &Path) -> std::io::Result<Self> {
        let path = dir.join(format!("{}.json", T::RESOURCE));
        let rows = match std::fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("{} 数据文件已损坏: {e}", path.display()),
                )
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e),
        };
        tracing::debug!("加载 {} 条{}", rows.len(), T::NAME);
        Ok(Self {
            path,
            rows: RwLock::new(rows),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn all(&self) -> Vec<T> {
        self.rows.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        self.find(|r| r.id() == id).await
    }

    pub async fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.rows.read().await.iter().find(|r| pred(r)).cloned()
    }

    pub async fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows
            .read()
            .await
            .iter()
            .filter(|r| pred(r))
            .cloned()
            .collect()
    }

    /// 编号为空时自动生成；编号已存在时拒绝
    pub async fn insert(&self, record: T) -> Result<T, Response> {
        self.insert_checked(record, |_, _| Ok(())).await
    }

    /// 和 `insert` 一样，`check` 与写入在同一把写锁下执行
    pub async fn insert_checked(
        &self,
        mut record: T,
        check: impl FnOnce(&[T], &T) -> Result<(), Response>,
    ) -> Result<T, Response> {
        self.c_or_r(|rows| {
            check(rows, &record)?;
            if record.id().is_empty() {
                record.set_id(gen_id(T::PREFIX, |id| rows.iter().any(|r| r.id() == id)));
            } else if rows.iter().any(|r| r.id() == record.id()) {
                return Err(Response::already_exist(format!(
                    "{} {} 已存在",
                    T::NAME,
                    record.id()
                )));
            }
            rows.push(record.clone());
            Ok(record)
        })
        .await
    }

    /// 整条替换，返回旧值
    pub async fn update(&self, id: &str, mut record: T) -> Result<T, Response> {
        record.set_id(id.to_owned());
        self.c_or_r(|rows| {
            let slot = rows
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or_else(|| Response::not_exist(format!("{} {id} 不存在", T::NAME)))?;
            Ok(std::mem::replace(slot, record))
        })
        .await
    }

    /// 按编号覆盖，不存在时追加；返回旧值
    pub async fn upsert(&self, record: T) -> Result<Option<T>, Response> {
        self.c_or_r(|rows| match rows.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => Ok(Some(std::mem::replace(slot, record))),
            None => {
                rows.push(record);
                Ok(None)
            }
        })
        .await
    }

    /// 在原记录上修改，返回修改后的值
    pub async fn modify(
        &self,
        id: &str,
        f: impl FnOnce(&mut T) -> Result<(), Response>,
    ) -> Result<T, Response> {
        self.modify_checked(id, |_| Ok(()), f).await
    }

    /// `check` 先看到全部记录，通过后再修改，两步在同一把写锁下
    pub async fn modify_checked(
        &self,
        id: &str,
        check: impl FnOnce(&[T]) -> Result<(), Response>,
        f: impl FnOnce(&mut T) -> Result<(), Response>,
    ) -> Result<T, Response> {
        self.c_or_r(|rows| {
            check(rows)?;
            let slot = rows
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or_else(|| Response::not_exist(format!("{} {id} 不存在", T::NAME)))?;
            f(slot)?;
            Ok(slot.clone())
        })
        .await
    }

    pub async fn remove(&self, id: &str) -> Result<T, Response> {
        self.c_or_r(|rows| {
            let pos = rows
                .iter()
                .position(|r| r.id() == id)
                .ok_or_else(|| Response::not_exist(format!("{} {id} 不存在", T::NAME)))?;
            Ok(rows.remove(pos))
        })
        .await
    }

    /// 成功提交，失败回滚
    async fn c_or_r<R>(
        &self,
        f: impl FnOnce(&mut Vec<T>) -> Result<R, Response>,
    ) -> Result<R, Response> {
        let mut rows = self.rows.write().await;
        let mut next = rows.clone();
        let out = f(&mut next)?;
        if let Err(e) = self.persist(&next).await {
            tracing::error!("写入 {} 失败，已回滚: {e}", self.path.display());
            return Err(Response::internal_server_error(e));
        }
        *rows = next;
        Ok(out)
    }

    async fn persist(&self, rows: &[T]) -> std::io::Result<()> {
        let text = serde_json::to_vec_pretty(rows)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &self.path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OrderStatus, Order};

    fn order(customer: &str) -> Order {
        serde_json::from_value(serde_json::json!({
            "customer": customer, "address": "Calle 1", "amount": 10
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn insert_generates_id_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let table: Table<Order> = Table::load(dir.path()).unwrap();
        let saved = table.insert(order("Luis")).await.unwrap();
        assert!(saved.id.starts_with("O-"));

        let reloaded: Table<Order> = Table::load(dir.path()).unwrap();
        assert_eq!(reloaded.all().await, vec![saved]);
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let table: Table<Order> = Table::load(dir.path()).unwrap();
        let mut o = order("Luis");
        o.id = "O-000001".into();
        table.insert(o.clone()).await.unwrap();
        let err = table.insert(o).await.unwrap_err();
        assert_eq!(err.status(), 3);
        assert_eq!(table.len().await, 1);
    }

    #[tokio::test]
    async fn update_modify_remove() {
        let dir = tempfile::tempdir().unwrap();
        let table: Table<Order> = Table::load(dir.path()).unwrap();
        let saved = table.insert(order("Luis")).await.unwrap();

        let previous = table.update(&saved.id, order("Marta")).await.unwrap();
        assert_eq!(previous.customer, "Luis");
        assert_eq!(table.get(&saved.id).await.unwrap().customer, "Marta");

        let paid = table
            .modify(&saved.id, |o| {
                o.status = OrderStatus::Paid;
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);

        table.remove(&saved.id).await.unwrap();
        assert!(table.is_empty().await);
        assert_eq!(table.remove(&saved.id).await.unwrap_err().status(), 2);
        assert_eq!(table.update("O-404", order("X")).await.unwrap_err().status(), 2);
    }

    fn same_customer(rows: &[Order], o: &Order) -> Result<(), Response> {
        match rows.iter().any(|r| r.customer == o.customer) {
            true => Err(Response::already_exist(format!("{} 已存在", o.customer))),
            false => Ok(()),
        }
    }

    #[tokio::test]
    async fn concurrent_checked_inserts_admit_one() {
        let dir = tempfile::tempdir().unwrap();
        let table = std::sync::Arc::new(Table::<Order>::load(dir.path()).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let table = table.clone();
                tokio::spawn(async move { table.insert_checked(order("Luis"), same_customer).await })
            })
            .collect();
        let mut saved = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => saved += 1,
                Err(e) => assert_eq!(e.status(), 3),
            }
        }
        assert_eq!(saved, 1);
        assert_eq!(table.len().await, 1);
    }

    #[tokio::test]
    async fn modify_checked_sees_other_rows() {
        let dir = tempfile::tempdir().unwrap();
        let table: Table<Order> = Table::load(dir.path()).unwrap();
        let luis = table.insert(order("Luis")).await.unwrap();
        let marta = table.insert(order("Marta")).await.unwrap();
        let err = table
            .modify_checked(
                &marta.id,
                |rows| same_customer(rows, &order("Luis")),
                |o| {
                    o.customer = "Luis".into();
                    Ok(())
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status(), 3);
        assert_eq!(table.get(&marta.id).await.unwrap().customer, "Marta");
        assert_eq!(table.get(&luis.id).await.unwrap().customer, "Luis");
    }

    #[tokio::test]
    async fn failed_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let table: Table<Order> = Table::load(dir.path()).unwrap();
        table.insert(order("Luis")).await.unwrap();
        // 目录被删除后写盘失败
        drop(dir);
        assert!(table.insert(order("Marta")).await.is_err());
        assert_eq!(table.len().await, 1);
    }

    #[test]
    fn corrupt_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("orders.json"), "[{").unwrap();
        assert!(Table::<Order>::load(dir.path()).is_err());
        std::fs::write(dir.path().join("orders.json"), "  \n").unwrap();
        assert!(Table::<Order>::load(dir.path()).is_ok());
    }
}
