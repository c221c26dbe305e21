//! Пул потоков фиксированного размера над очередью с двойной буферизацией
//!
//! # Features
//! - Очередь из put/get буферов со сменой ролей: потребители забирают
//!   целую партию за один захват блокировки
//! - Ограниченная ёмкость и блокировка производителей (backpressure)
//! - Неблокирующий режим для разбора остатка при остановке
//! - Graceful shutdown с ожиданием всех воркеров
//! - Метрики пула и фоновый мониторинг
//! - Конфигурация для CPU-bound и I/O-bound workloads

pub mod model;
pub mod pool;
pub mod queue;

pub use model::PoolMetrics;
pub use pool::{Config, Handle, MonitorHandle, Task, ThreadPool};
pub use queue::SwapQueue;
