use crate::model::Role;

/// 需要按角色区分的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// 新建、修改、删除用户
    ManageUsers,
    ViewUsers,
    /// 查看所有人的销售，否则只能看自己的
    ViewAllSales,
    /// 修改、删除销售记录
    EditSales,
    ManageProducts,
    CreateOrders,
    /// 修改订单、变更状态、删除
    ManageOrders,
    ExportData,
}

impl Role {
    pub fn can(&self, action: Action) -> bool {
        match self {
            Role::Admin => true,
            Role::Supervisor => !matches!(action, Action::ManageUsers),
            Role::Seller => matches!(action, Action::CreateOrders),
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Seller => "seller",
            Role::Supervisor => "supervisor",
        }
    }
}

/// 权限不足时记录日志并返回
#[macro_export]
macro_rules! verify_perms {
    ($user:expr, $action:expr) => {
        if !$user.role.can($action) {
            tracing::warn!(
                "{}({}) 无权执行 {:?}",
                $user.name,
                $user.role.as_str(),
                $action
            );
            return Err($crate::Response::permission_denied());
        }
    };
}
