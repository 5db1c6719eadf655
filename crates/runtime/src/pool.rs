use std::future::Future;

use futures_util::future::join_all;

/// Runs `task` over `items` with at most `window` futures in flight.
///
/// Items are started in input order, one batch at a time; a batch is fully
/// settled before the next one starts. Outputs are returned in input order.
pub async fn run_in_batches<T, F, Fut>(items: Vec<T>, window: usize, mut task: F) -> Vec<Fut::Output>
where
    F: FnMut(T) -> Fut,
    Fut: Future,
{
    let window = window.max(1);
    let mut out = Vec::with_capacity(items.len());
    let mut batch = Vec::with_capacity(window);

    for item in items {
        batch.push(task(item));
        if batch.len() >= window {
            out.extend(join_all(std::mem::take(&mut batch)).await);
        }
    }
    if !batch.is_empty() {
        out.extend(join_all(batch).await);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::run_in_batches;

    #[test]
    fn preserves_order_and_batches() {
        let log = RefCell::new(Vec::new());
        let log_ref = &log;
        let out = pollster::block_on(run_in_batches((0..7).collect(), 3, move |i| {
            log_ref.borrow_mut().push(format!("start {i}"));
            async move {
                log_ref.borrow_mut().push(format!("end {i}"));
                i * 10
            }
        }));
        assert_eq!(out, vec![0, 10, 20, 30, 40, 50, 60]);

        // Nothing from the second batch starts before the first settles.
        let log = log.into_inner();
        let end_2 = log.iter().position(|s| s == "end 2").unwrap();
        let start_3 = log.iter().position(|s| s == "start 3").unwrap();
        assert!(end_2 < start_3);
    }

    #[test]
    fn zero_window_is_treated_as_one() {
        let out = pollster::block_on(run_in_batches(vec![1, 2], 0, |i| async move { i }));
        assert_eq!(out, vec![1, 2]);
    }
}
