//! 同步原语
//!
//! 向设备模型和驱动提供基本的锁：
//! - [`SpinLock`]：互斥自旋锁，保护驱动的实例表、总线绑定表等短临界区；
//! - [`RwLock`]：读写自旋锁，用于"初始化阶段写、运行时读"的注册表。
//!
//! 两者都只实现底层的原子 raw lock，守卫与数据封装交给 `lock_api`。

#![no_std]

mod raw_spin_lock;
mod rwlock;
mod spin_lock;

pub use raw_spin_lock::RawSpinLock;
pub use rwlock::{RawRwSpinLock, RwLock, RwLockReadGuard, RwLockWriteGuard};
pub use spin_lock::{SpinLock, SpinLockGuard};
