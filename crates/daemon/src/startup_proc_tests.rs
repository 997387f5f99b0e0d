use super::*;

#[tokio::test]
async fn run_completes_with_a_zero_exit_code() {
    assert_eq!(run().await, 0);
}
