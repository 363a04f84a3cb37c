pub mod cache;
pub mod dser;
pub mod headers;
pub mod perm;
pub mod time;
pub mod validate;

use rand::Rng;

/// 三目运算符，用宏简单实现
#[macro_export]
macro_rules! do_if {
    ($pat:expr => $suc:expr, $e:expr) => {
        if $pat {
            $suc
        } else {
            $e
        }
    };
}

/// 随机生成编号，`exists` 返回 true 时重新生成。
///
/// 只对当前内存中的列表去重，多个客户端同时创建时不保证全局唯一。
pub fn gen_id(prefix: &str, exists: impl Fn(&str) -> bool) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let id = format!("{}-{:06}", prefix, rng.gen_range(0..1_000_000u32));
        if !exists(&id) {
            return id;
        }
    }
}

/// 保留两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
