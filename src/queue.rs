//! Очередь с двойной буферизацией.
//!
//! Производители всегда кладут в put-буфер, потребители читают из get-буфера.
//! Когда get-буфер пустеет, потребитель меняет буферы ролями за одну
//! критическую секцию и дальше разбирает целую партию без блокировок
//! со стороны производителей. Захват мьютекса амортизируется на партию,
//! а не оплачивается на каждом элементе.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};

/// Ограниченная MPMC-очередь на двух буферах со сменой ролей.
///
/// В блокирующем режиме `put` ждёт, пока в put-буфере не станет меньше
/// `capacity` элементов, а `get` ждёт появления данных. В неблокирующем
/// режиме обе операции возвращаются сразу: `put` кладёт без ограничения,
/// `get` на пустой очереди возвращает `None`.
pub struct SwapQueue<T> {
    capacity: usize,
    nonblocking: AtomicBool,
    // Суммарное наполнение обоих буферов. Наблюдатели читают счетчик
    // без захвата мьютексов: спящий в смене буферов потребитель держит
    // get-мьютекс, и ждать его наблюдателям нельзя.
    pending: AtomicUsize,
    put_side: Mutex<VecDeque<T>>,
    get_side: Mutex<VecDeque<T>>,
    // Оба condvar связаны с мьютексом put-буфера.
    space_available: Condvar,
    data_available: Condvar,
}

impl<T> SwapQueue<T> {
    /// Создает пустую очередь с ёмкостью put-буфера `capacity`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "capacity must be at least 1");
        SwapQueue {
            capacity,
            nonblocking: AtomicBool::new(false),
            pending: AtomicUsize::new(0),
            put_side: Mutex::new(VecDeque::new()),
            get_side: Mutex::new(VecDeque::new()),
            space_available: Condvar::new(),
            data_available: Condvar::new(),
        }
    }

    /// Кладет элемент в put-буфер.
    ///
    /// В блокирующем режиме ждёт, пока put-буфер не опустится ниже ёмкости.
    /// Место освобождается только сменой буферов на стороне потребителя.
    pub fn put(&self, value: T) {
        let mut put_side = self.put_side.lock().unwrap();
        // Повторная проверка после каждого пробуждения: wait может
        // вернуться спонтанно, а режим мог смениться.
        while put_side.len() >= self.capacity && !self.nonblocking.load(Ordering::SeqCst) {
            put_side = self.space_available.wait(put_side).unwrap();
        }
        put_side.push_back(value);
        self.pending.fetch_add(1, Ordering::Relaxed);
        drop(put_side);
        self.data_available.notify_one();
    }

    /// Забирает элемент из get-буфера.
    ///
    /// Если get-буфер пуст, выполняет смену буферов и при необходимости
    /// ждёт данных. `None` возвращается только в неблокирующем режиме,
    /// когда пусты оба буфера.
    pub fn get(&self) -> Option<T> {
        let mut get_side = self.get_side.lock().unwrap();
        let value = if let Some(value) = get_side.pop_front() {
            Some(value)
        } else if self.swap_buffers(&mut get_side) > 0 {
            get_side.pop_front()
        } else {
            None
        };
        if value.is_some() {
            self.pending.fetch_sub(1, Ordering::Relaxed);
        }
        value
    }

    /// Меняет буферы ролями. Вызывается только с пустым get-буфером
    /// и только под его мьютексом.
    ///
    /// Единственное место, где захвачены оба мьютекса. Порядок захвата
    /// фиксированный: сначала get, потом put. Ждать на `data_available`
    /// может максимум один поток, остальные потребители стоят на
    /// мьютексе get-буфера.
    fn swap_buffers(&self, get_side: &mut VecDeque<T>) -> usize {
        let mut put_side = self.put_side.lock().unwrap();
        while put_side.is_empty() && !self.nonblocking.load(Ordering::SeqCst) {
            put_side = self.data_available.wait(put_side).unwrap();
        }
        let count = put_side.len();
        if count >= self.capacity {
            // Буфер был заполнен, производители могли уснуть.
            self.space_available.notify_all();
        }
        std::mem::swap(get_side, &mut *put_side);
        count
    }

    /// Переводит очередь в неблокирующий режим и будит всех ожидающих.
    ///
    /// Идемпотентна. Флаг ставится до захвата мьютекса, поэтому
    /// проснувшиеся потоки гарантированно видят новый режим.
    pub fn set_nonblocking(&self) {
        self.nonblocking.store(true, Ordering::SeqCst);
        let _put_side = self.put_side.lock().unwrap();
        self.data_available.notify_one();
        self.space_available.notify_all();
    }

    /// Возвращает очередь в блокирующий режим. Никого не будит.
    pub fn set_blocking(&self) {
        self.nonblocking.store(false, Ordering::SeqCst);
    }

    pub fn is_nonblocking(&self) -> bool {
        self.nonblocking.load(Ordering::SeqCst)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Суммарное число элементов в обоих буферах. Снимок на момент
    /// вызова, к моменту возврата может устареть.
    pub fn len(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
