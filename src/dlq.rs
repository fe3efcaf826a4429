use crate::domain::{DeadLetterQueue, Error};

#[derive(Default, Debug)]
pub struct TracingDLQ {}

impl DeadLetterQueue for TracingDLQ {
    fn report(&self, error: &Error) {
        tracing::warn!(kind = ?error.kind(), %error, "command rejected");
    }
}
