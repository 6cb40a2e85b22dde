//! Error taxonomy for the submission, close and store paths

/// A single user-correctable rule violation. The message text is what the
/// caller presents, numbered when more than one violation is reported.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("Customer is required.")]
    CustomerMissing,
    #[error("Customer cannot have no letters or numbers.")]
    CustomerNotAlphanumeric,
    #[error("Select a product is required.")]
    PartCodeNotSelected,
    #[error("Either select a product or enter a new product name.")]
    NewPartCodeMissing,
    #[error("New product name entered already exists.")]
    NewPartCodeExists,
    #[error("New product name is invalid.")]
    NewPartCodeReserved,
    #[error("New product name cannot have no letters or numbers.")]
    NewPartCodeNotAlphanumeric,
    #[error("Selected product is not in the catalog.")]
    UnknownPartCode,
    #[error("DO number is required.")]
    DoNumberMissing,
    #[error("DO Number cannot have no letters or numbers.")]
    DoNumberNotAlphanumeric,
    #[error("Invalid quantity of defective products and unit cost.")]
    ZeroQuantityAndCost,
    #[error("Invalid quantity of defective products.")]
    ZeroQuantity,
    #[error("Invalid unit cost.")]
    ZeroCost,
    #[error("Descriptions of defect(s) and action(s) taken are required.")]
    DescriptionAndActionMissing,
    #[error("Descriptions of defect(s) and action(s) taken cannot have no letters or numbers.")]
    DescriptionAndActionNotAlphanumeric,
    #[error("Description of defect(s) is required.")]
    DescriptionMissing,
    #[error("Description of defect(s) cannot have no letters or numbers.")]
    DescriptionNotAlphanumeric,
    #[error("Description of action(s) taken is required.")]
    ActionMissing,
    #[error("Description of action(s) taken cannot have no letters or numbers.")]
    ActionNotAlphanumeric,
    #[error("Submitter is required.")]
    SubmitterMissing,
    #[error("Submitter cannot have no letters or numbers.")]
    SubmitterNotAlphanumeric,
    #[error("Check the checkbox before submitting.")]
    NotAcknowledged,
    #[error("Additional comments cannot have no letters or numbers.")]
    CommentNotAlphanumeric,
    #[error("Enter name in case closed by.")]
    ClosedByMissing,
    #[error("Name cannot have no letters or numbers.")]
    ClosedByNotAlphanumeric,
    #[error("Check the checkbox first.")]
    CloseNotAcknowledged,
}

#[derive(thiserror::Error, Debug)]
pub enum SubmitError {
    #[error("{}", crate::utils::format_violations(.0))]
    Rejected(Vec<Violation>),
    #[error("This submission already exists. Please do not submit a duplicate.")]
    Duplicate,
}

#[derive(thiserror::Error, Debug)]
pub enum CloseError {
    #[error("{}", crate::utils::format_violations(.0))]
    Rejected(Vec<Violation>),
    #[error("Case {0} is not visible in this session.")]
    UnknownCase(String),
    #[error("Case {0} is already closed.")]
    AlreadyClosed(String),
    // The case exists in the session cache but the row-locate against the
    // backing store missed. No cell writes are issued in this situation.
    #[error("Case {0} is missing from the backing store.")]
    RowMissing(String),
}

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("No authenticated account for this session.")]
    NotAuthenticated,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(#[from] sled::Error),
    #[error("row codec error: {0}")]
    Codec(String),
    #[error("row {0} not found in store")]
    MissingRow(u64),
    #[error("column index {0} out of range")]
    ColumnOutOfRange(usize),
}
