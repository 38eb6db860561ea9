//! 並列一括実行
//!
//! 全要素のリクエストを同時に発行し、完了順に関係なく入力順で結果を返す。
//! 同時実行数の上限・キャンセル・リトライは持たない。

use futures::future::join_all;
use std::future::Future;

/// `items` の各要素に `f` を適用し、入力順の結果を返す
///
/// 失敗は各要素の出力に閉じ込めること（`R` に `Result` や
/// `PredictionResult::failed()` を使う）。1件の失敗で他を止めない。
pub async fn run_batch<'a, T, R, F, Fut>(items: &'a [T], f: F) -> Vec<R>
where
    F: Fn(usize, &'a T) -> Fut,
    Fut: Future<Output = R>,
{
    join_all(items.iter().enumerate().map(|(i, item)| f(i, item))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_empty_input() {
        let items: Vec<u32> = Vec::new();
        let out = block_on(run_batch(&items, |_, x| async move { *x }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_order_preserved_when_completed_in_reverse() {
        let items = vec!["a", "b", "c", "d"];
        let mut senders = Vec::new();
        let mut receivers = Vec::new();
        for _ in &items {
            let (tx, rx) = oneshot::channel::<()>();
            senders.push(tx);
            receivers.push(std::sync::Mutex::new(Some(rx)));
        }

        // 後ろの要素から順に完了させる
        let handle = thread::spawn(move || {
            for tx in senders.into_iter().rev() {
                thread::sleep(Duration::from_millis(5));
                let _ = tx.send(());
            }
        });

        let out = block_on(run_batch(&items, |i, item| {
            let rx = receivers[i].lock().unwrap().take().unwrap();
            async move {
                let _ = rx.await;
                format!("{}{}", item, i)
            }
        }));
        handle.join().unwrap();

        assert_eq!(out, vec!["a0", "b1", "c2", "d3"]);
    }

    #[test]
    fn test_failures_are_isolated() {
        let items = vec![1, 2, 3];
        let out: Vec<Result<i32, String>> = block_on(run_batch(&items, |_, x| {
            let x = *x;
            async move {
                if x == 2 {
                    Err("boom".to_string())
                } else {
                    Ok(x * 10)
                }
            }
        }));
        assert_eq!(out, vec![Ok(10), Err("boom".to_string()), Ok(30)]);
    }
}
