use std::sync::Arc;

use dashmap::DashMap;

macro_rules! gen_cache {
    ($(($N:ident, $T:ty)), +) => {
        lazy_static::lazy_static! {
            $(
                pub static ref $N: Arc<DashMap<String, $T>> = {
                    Arc::new(DashMap::new())
                };
            )+
        }
    };
}

gen_cache! {
    // 用户id -> 毫秒时间戳，早于该时间签发的token全部失效（登出、停用、改密码时写入）
    (TOKEN_NOT_BEFORE, i64)
}

/// 令用户此前签发的 token 失效，返回新的生效时间
pub fn revoke_tokens(user_id: &str, now: i64) -> i64 {
    let not_before = now + 1;
    TOKEN_NOT_BEFORE.insert(user_id.to_owned(), not_before);
    not_before
}

/// 启动时从 tokens.json 恢复，只会把时间往后推
pub fn restore(user_id: &str, tbn: i64) {
    TOKEN_NOT_BEFORE
        .entry(user_id.to_owned())
        .and_modify(|cur| *cur = (*cur).max(tbn))
        .or_insert(tbn);
}

pub fn not_before(user_id: &str) -> Option<i64> {
    TOKEN_NOT_BEFORE.get(user_id).map(|tbn| *tbn)
}

pub fn is_revoked(user_id: &str, issued_at: i64) -> bool {
    TOKEN_NOT_BEFORE
        .get(user_id)
        .is_some_and(|tbn| issued_at < *tbn)
}
