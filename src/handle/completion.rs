/// Non-error outcome of an entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// `SQL_SUCCESS`
    Success,
    /// `SQL_SUCCESS_WITH_INFO`; a warning record was appended.
    SuccessWithInfo,
    /// `SQL_NO_DATA`
    NoData,
}

impl Completion {
    /// True for both success variants.
    pub fn is_success(self) -> bool {
        matches!(self, Completion::Success | Completion::SuccessWithInfo)
    }
}
