use log::{debug, info, warn};

use crate::store::{ClassSchema, StoreError, VectorStore};

/// 遇到已存在的 class 时如何处理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecreatePolicy {
    /// 只删除与目标形状一致的 class，避免误删其他数据
    IfCompatible,
    /// 无论形状如何都删除重建
    Always,
}

/// schema 初始化结果
#[derive(Debug)]
pub enum BootstrapOutcome {
    /// 直接创建成功
    Created,
    /// 删除旧的 class 后重新创建成功
    Recreated,
    /// 重试后仍然失败，服务无法继续
    Failed(StoreError),
}

impl BootstrapOutcome {
    pub fn is_ready(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    pub fn into_result(self) -> Result<(), StoreError> {
        match self {
            Self::Failed(e) => Err(e),
            _ => Ok(()),
        }
    }
}

/// 确保 `schema` 在数据库中存在
///
/// 先尝试创建；失败时检查已有的 class，按 `policy` 删除后再重试一次。
/// 重试失败时返回 [`BootstrapOutcome::Failed`]，由调用方决定是否退出进程。
pub async fn ensure_schema(
    store: &dyn VectorStore,
    schema: &ClassSchema,
    policy: RecreatePolicy,
) -> BootstrapOutcome {
    let err = match store.create_class(schema).await {
        Ok(()) => {
            info!("已创建 class {}", schema.class);
            return BootstrapOutcome::Created;
        }
        Err(err) => err,
    };
    warn!("创建 class {} 失败: {err}，尝试删除后重建", schema.class);

    match store.get_class(&schema.class).await {
        Ok(Some(existing)) => {
            if policy == RecreatePolicy::IfCompatible && !existing.is_compatible_with(schema) {
                return BootstrapOutcome::Failed(StoreError::Conflict(format!(
                    "已存在的 class {} 与所需结构不一致，拒绝删除",
                    schema.class
                )));
            }
            if let Err(e) = store.delete_class(&schema.class).await {
                return BootstrapOutcome::Failed(e);
            }
            info!("已删除旧的 class {}", schema.class);
        }
        Ok(None) => debug!("class {} 不存在，直接重试创建", schema.class),
        Err(e) => return BootstrapOutcome::Failed(e),
    }

    match store.create_class(schema).await {
        Ok(()) => {
            info!("已重新创建 class {}", schema.class);
            BootstrapOutcome::Recreated
        }
        Err(e) => BootstrapOutcome::Failed(e),
    }
}
