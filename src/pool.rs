use super::{
    model::PoolMetrics,
    queue::SwapQueue,
};
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Condvar, Mutex,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error};

/// Задача пула: одноразовое замыкание без результата.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Конфигурация пула потоков
#[derive(Debug, Clone)]
pub struct Config {
    pub num_threads: usize,
    pub queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_threads: 12,
            queue_capacity: 128,
        }
    }
}

impl Config {
    pub fn cpu_bound() -> Self {
        let num_cpus = num_cpus::get();
        Self {
            num_threads: num_cpus,
            queue_capacity: num_cpus * 10,
        }
    }

    pub fn io_bound() -> Self {
        let num_cpus = num_cpus::get();
        Self {
            num_threads: num_cpus * 2,
            queue_capacity: usize::MAX, // Производители не блокируются
        }
    }
}

// Состояние, разделяемое воркерами, хендлами и самим пулом.
struct Shared {
    queue: SwapQueue<Task>,
    stopped: AtomicBool,
    submitted: AtomicUsize,
    completed: AtomicUsize,
    live_workers: AtomicUsize,
    panicked_workers: AtomicUsize,
}

impl Shared {
    fn execute(&self, task: Task) {
        // put может заблокироваться на заполненном буфере.
        self.queue.put(task);
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> PoolMetrics {
        PoolMetrics {
            pending_tasks: self.queue.len(),
            submitted_tasks: self.submitted.load(Ordering::Relaxed),
            completed_tasks: self.completed.load(Ordering::Relaxed),
            live_workers: self.live_workers.load(Ordering::Relaxed),
            panicked_workers: self.panicked_workers.load(Ordering::Relaxed),
        }
    }
}

/// Пул потоков фиксированного размера над очередью с двойной буферизацией
///
/// Воркеры конкурируют за задачи из общей очереди. Остановка переводит
/// очередь в неблокирующий режим, воркеры дорабатывают остаток и выходят,
/// `shutdown` дожидается каждого из них.
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    pub fn new(num_threads: usize, queue_capacity: usize) -> ThreadPool {
        Self::with_config(Config {
            num_threads,
            queue_capacity,
        })
    }

    pub fn with_config(config: Config) -> ThreadPool {
        assert!(config.num_threads >= 1, "num_threads must be at least 1");
        assert!(config.queue_capacity >= 1, "queue_capacity must be at least 1");

        let shared = Arc::new(Shared {
            queue: SwapQueue::new(config.queue_capacity),
            stopped: AtomicBool::new(false),
            submitted: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            live_workers: AtomicUsize::new(config.num_threads),
            panicked_workers: AtomicUsize::new(0),
        });

        debug!(
            num_threads = config.num_threads,
            queue_capacity = config.queue_capacity,
            "starting thread pool"
        );

        // Запускаем воркеры
        let workers = (0..config.num_threads)
            .map(|index| {
                let shared = Arc::clone(&shared);
                thread::Builder::new()
                    .name(format!("worker-{}", index))
                    .spawn(move || worker_loop(&shared, index))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        ThreadPool { shared, workers }
    }

    /// Отправляет задачу в очередь пула.
    ///
    /// Блокируется, пока put-буфер очереди заполнен. После остановки пула
    /// вставка проходит без блокировки, но задачу уже никто не выполнит.
    /// Погибшие от паник воркеры не заменяются: если погибли все, очередь
    /// перестает опустошаться и вставка виснет после заполнения буфера.
    pub fn execute<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.execute(Box::new(task));
    }

    /// Клонируемый хендл для отправки задач из других потоков
    /// и из самих задач.
    pub fn handle(&self) -> Handle {
        Handle {
            shared: Arc::clone(&self.shared),
        }
    }

    #[inline]
    pub fn metrics(&self) -> PoolMetrics {
        self.shared.snapshot()
    }

    /// Останавливает пул и дожидается всех воркеров.
    ///
    /// Всё, что легло в очередь до вызова, будет выполнено. Задачи,
    /// отправляемые конкурентно с остановкой, могут быть потеряны.
    pub fn shutdown(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        if !self.shared.stopped.swap(true, Ordering::SeqCst) {
            debug!("shutting down, switching queue to nonblocking mode");
            self.shared.queue.set_nonblocking();
        }
        for handle in self.workers.drain(..) {
            // Паника воркера уже учтена его сторожем.
            let _ = handle.join();
        }
    }

    /// Мониторинг метрик с callback
    /// ВАЖНО: вызовите handle.stop() для остановки мониторинга, иначе
    /// фоновый поток живет до дропа хендла
    pub fn start_monitoring<F>(&self, interval: Duration, callback: F) -> MonitorHandle
    where
        F: Fn(PoolMetrics) + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let state = Arc::new((Mutex::new(false), Condvar::new()));
        let thread_state = Arc::clone(&state);

        let thread = thread::Builder::new()
            .name("pool-monitor".to_string())
            .spawn(move || {
                let (stop, wake) = &*thread_state;
                let mut stopped = stop.lock().unwrap();
                while !*stopped {
                    let (guard, timeout) = wake.wait_timeout(stopped, interval).unwrap();
                    stopped = guard;
                    if !*stopped && timeout.timed_out() {
                        callback(shared.snapshot());
                    }
                }
            })
            .expect("failed to spawn monitor thread");

        MonitorHandle {
            state,
            thread: Some(thread),
        }
    }
}

impl Default for ThreadPool {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}

/// Хендл для отправки задач без владения пулом. Клонируется свободно,
/// держит очередь живой, но не участвует в остановке.
#[derive(Clone)]
pub struct Handle {
    shared: Arc<Shared>,
}

impl Handle {
    pub fn execute<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.execute(Box::new(task));
    }
}

// Сторож жизни воркера. Дроп срабатывает и при нормальном выходе,
// и при раскрутке паники из задачи.
struct Sentinel<'a> {
    shared: &'a Shared,
    index: usize,
}

impl Drop for Sentinel<'_> {
    fn drop(&mut self) {
        self.shared.live_workers.fetch_sub(1, Ordering::Relaxed);
        if thread::panicking() {
            self.shared.panicked_workers.fetch_add(1, Ordering::Relaxed);
            error!(worker = self.index, "worker thread killed by task panic");
        }
    }
}

fn worker_loop(shared: &Shared, index: usize) {
    let _sentinel = Sentinel { shared, index };
    debug!(worker = index, "worker thread started");
    // Единственный выход из цикла: оба буфера очереди пусты
    // и очередь в неблокирующем режиме.
    while let Some(task) = shared.queue.get() {
        task();
        shared.completed.fetch_add(1, Ordering::Relaxed);
    }
    debug!(worker = index, "queue drained, worker exiting");
}

/// Хендл фонового монитора.
pub struct MonitorHandle {
    state: Arc<(Mutex<bool>, Condvar)>,
    thread: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Останавливает монитор и дожидается его потока.
    pub fn stop(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        let (stop, wake) = &*self.state;
        *stop.lock().unwrap() = true;
        wake.notify_one();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
