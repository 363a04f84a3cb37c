use std::{
    future::Future,
    sync::{Arc, RwLock},
};

use tokio::task::JoinHandle;

use crate::{libs::gen_id, model::Record};

use super::ClientError;

/// 前端持有的一份记录列表。
///
/// 乐观更新先改本地数据，再在后台调用接口，失败时恢复成修改前的值。
/// 同一条记录的多个并发修改之间不保证顺序。
#[derive(Debug)]
pub struct LocalStore<T: Record> {
    rows: Arc<RwLock<Vec<T>>>,
}

impl<T: Record> Clone for LocalStore<T> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
        }
    }
}

impl<T: Record> Default for LocalStore<T> {
    fn default() -> Self {
        Self {
            rows: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T: Record> LocalStore<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows)),
        }
    }

    pub fn rows(&self) -> Vec<T> {
        self.rows.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.rows
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    /// 用拉取到的数据整体替换
    pub fn replace_all(&self, rows: Vec<T>) {
        *self.rows.write().unwrap_or_else(|e| e.into_inner()) = rows;
    }

    fn with_rows<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        f(&mut self.rows.write().unwrap_or_else(|e| e.into_inner()))
    }

    /// 先以临时编号插入，接口返回后换成服务端保存的记录
    pub fn optimistic_insert<F>(&self, mut record: T, remote: F) -> JoinHandle<Result<T, ClientError>>
    where
        F: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let temp_id = self.with_rows(|rows| {
            let id = gen_id("tmp", |id| rows.iter().any(|r| r.id() == id));
            record.set_id(id.clone());
            rows.push(record);
            id
        });
        let store = self.clone();
        tokio::spawn(async move {
            let result = remote.await;
            store.with_rows(|rows| {
                let pos = rows.iter().position(|r| r.id() == temp_id);
                match (&result, pos) {
                    (Ok(saved), Some(pos)) => rows[pos] = saved.clone(),
                    (Ok(saved), None) => rows.push(saved.clone()),
                    (Err(_), Some(pos)) => {
                        rows.remove(pos);
                    }
                    (Err(_), None) => {}
                }
            });
            if let Err(e) = &result {
                tracing::warn!("新增{}失败，已撤销: {e}", T::NAME);
            }
            result
        })
    }

    pub fn optimistic_update<F>(&self, record: T, remote: F) -> JoinHandle<Result<T, ClientError>>
    where
        F: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let id = record.id().to_owned();
        let previous = self.with_rows(|rows| match rows.iter_mut().find(|r| r.id() == id) {
            Some(slot) => Some(std::mem::replace(slot, record)),
            None => {
                rows.push(record);
                None
            }
        });
        let store = self.clone();
        tokio::spawn(async move {
            let result = remote.await;
            store.with_rows(|rows| {
                let pos = rows.iter().position(|r| r.id() == id);
                match (&result, pos, previous) {
                    (Ok(saved), Some(pos), _) => rows[pos] = saved.clone(),
                    (Ok(saved), None, _) => rows.push(saved.clone()),
                    (Err(_), Some(pos), Some(old)) => rows[pos] = old,
                    (Err(_), Some(pos), None) => {
                        rows.remove(pos);
                    }
                    (Err(_), None, Some(old)) => rows.push(old),
                    (Err(_), None, None) => {}
                }
            });
            if let Err(e) = &result {
                tracing::warn!("修改{} {id} 失败，已恢复: {e}", T::NAME);
            }
            result
        })
    }

    pub fn optimistic_remove<F>(&self, id: &str, remote: F) -> JoinHandle<Result<(), ClientError>>
    where
        F: Future<Output = Result<(), ClientError>> + Send + 'static,
    {
        let id = id.to_owned();
        let removed = self.with_rows(|rows| {
            rows.iter()
                .position(|r| r.id() == id)
                .map(|pos| (pos, rows.remove(pos)))
        });
        let store = self.clone();
        tokio::spawn(async move {
            let result = remote.await;
            if let Err(e) = &result {
                if let Some((pos, old)) = removed {
                    store.with_rows(|rows| rows.insert(pos.min(rows.len()), old));
                }
                tracing::warn!("删除{} {id} 失败，已恢复: {e}", T::NAME);
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Order, OrderStatus};
    use tokio::sync::oneshot;

    fn order(id: &str, amount: f64) -> Order {
        Order {
            id: id.into(),
            customer: "Luis".into(),
            address: "Calle 1".into(),
            status: OrderStatus::Pending,
            amount,
            detail: String::new(),
            date: crate::libs::dser::parse_timestamp("2024-01-15").unwrap(),
        }
    }

    #[tokio::test]
    async fn insert_shows_immediately_and_takes_server_copy() {
        let store = LocalStore::default();
        let (tx, rx) = oneshot::channel::<Result<Order, ClientError>>();
        let handle = store.optimistic_insert(order("", 10.0), async move {
            rx.await.unwrap_or(Err(ClientError::Timeout))
        });
        assert_eq!(store.len(), 1);
        assert!(store.rows()[0].id.starts_with("tmp-"));

        tx.send(Ok(order("O-000001", 10.0))).unwrap();
        handle.await.unwrap().unwrap();
        assert_eq!(store.rows(), vec![order("O-000001", 10.0)]);
    }

    #[tokio::test]
    async fn failed_insert_is_rolled_back() {
        let store = LocalStore::new(vec![order("O-1", 1.0)]);
        let handle = store.optimistic_insert(order("", 10.0), async {
            Err(ClientError::Rejected("权限不足".into()))
        });
        assert!(handle.await.unwrap().is_err());
        assert_eq!(store.rows(), vec![order("O-1", 1.0)]);
    }

    #[tokio::test]
    async fn failed_update_restores_previous() {
        let store = LocalStore::new(vec![order("O-1", 1.0), order("O-2", 2.0)]);
        let (tx, rx) = oneshot::channel::<Result<Order, ClientError>>();
        let handle = store.optimistic_update(order("O-2", 99.0), async move {
            rx.await.unwrap_or(Err(ClientError::Timeout))
        });
        assert_eq!(store.get("O-2").unwrap().amount, 99.0);

        tx.send(Err(ClientError::Timeout)).unwrap();
        assert!(handle.await.unwrap().is_err());
        assert_eq!(store.get("O-2").unwrap().amount, 2.0);
    }

    #[tokio::test]
    async fn failed_remove_puts_record_back_in_place() {
        let store = LocalStore::new(vec![order("O-1", 1.0), order("O-2", 2.0), order("O-3", 3.0)]);
        let (tx, rx) = oneshot::channel::<Result<(), ClientError>>();
        let handle = store.optimistic_remove("O-2", async move {
            rx.await.unwrap_or(Err(ClientError::Timeout))
        });
        assert!(store.get("O-2").is_none());

        tx.send(Err(ClientError::Http("500".into()))).unwrap();
        assert!(handle.await.unwrap().is_err());
        let ids: Vec<String> = store.rows().into_iter().map(|o| o.id).collect();
        assert_eq!(ids, ["O-1", "O-2", "O-3"]);
    }

    #[tokio::test]
    async fn successful_remove_stays_removed() {
        let store = LocalStore::new(vec![order("O-1", 1.0)]);
        store.optimistic_remove("O-1", async { Ok(()) }).await.unwrap().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn replace_all_is_shared_between_clones() {
        let store = LocalStore::default();
        let view = store.clone();
        store.replace_all(vec![order("O-1", 1.0), order("O-2", 2.0)]);
        assert_eq!(view.len(), 2);
        assert_eq!(view.get("O-2").unwrap().amount, 2.0);
    }
}
