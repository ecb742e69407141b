//! 读写自旋锁
//!
//! 状态字最低位为写者标志，其余位为读者计数（每个读者占 [`READER`]）。

use core::{
    hint,
    sync::atomic::{AtomicUsize, Ordering},
};

use lock_api::{GuardSend, RawRwLock};

const WRITER: usize = 1;
const READER: usize = 2;

/// 原始读写自旋锁
#[derive(Debug)]
pub struct RawRwSpinLock {
    state: AtomicUsize,
}

impl RawRwSpinLock {
    /// 创建一个未上锁的读写锁。
    pub const fn new() -> Self {
        Self {
            state: AtomicUsize::new(0),
        }
    }
}

impl Default for RawRwSpinLock {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: 写者只能在状态为 0 时通过 CAS 进入；读者在写者标志置位时回退计数。
unsafe impl RawRwLock for RawRwSpinLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = RawRwSpinLock::new();

    type GuardMarker = GuardSend;

    fn lock_shared(&self) {
        while !self.try_lock_shared() {
            hint::spin_loop();
        }
    }

    fn try_lock_shared(&self) -> bool {
        let prev = self.state.fetch_add(READER, Ordering::Acquire);
        if prev & WRITER != 0 {
            self.state.fetch_sub(READER, Ordering::Release);
            false
        } else {
            true
        }
    }

    unsafe fn unlock_shared(&self) {
        self.state.fetch_sub(READER, Ordering::Release);
    }

    fn lock_exclusive(&self) {
        while !self.try_lock_exclusive() {
            hint::spin_loop();
        }
    }

    fn try_lock_exclusive(&self) -> bool {
        self.state
            .compare_exchange(0, WRITER, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    unsafe fn unlock_exclusive(&self) {
        self.state.fetch_and(!WRITER, Ordering::Release);
    }
}

/// 读写自旋锁
///
/// NOTE: 不防止写者饥饿，只适合写操作集中在初始化/注册阶段的场景。
pub type RwLock<T> = lock_api::RwLock<RawRwSpinLock, T>;

/// 读守卫
pub type RwLockReadGuard<'a, T> = lock_api::RwLockReadGuard<'a, RawRwSpinLock, T>;

/// 写守卫
pub type RwLockWriteGuard<'a, T> = lock_api::RwLockWriteGuard<'a, RawRwSpinLock, T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_readers() {
        let lock = RwLock::new(7);
        let r1 = lock.read();
        let r2 = lock.read();
        assert_eq!(*r1 + *r2, 14);
        assert!(lock.try_write().is_none());
    }

    #[test]
    fn test_writer_excludes_readers() {
        let lock = RwLock::new(0);
        {
            let mut w = lock.write();
            *w = 5;
            assert!(lock.try_read().is_none());
        }
        assert_eq!(*lock.read(), 5);
    }
}
