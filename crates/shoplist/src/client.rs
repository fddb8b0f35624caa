use crate::error::{Error, ErrorKind, ErrorOrigin, RejectKind};
use shoplist_core::{
    call::{AppCall, encode_index},
    dispatch::CallReceipt,
    host::Host,
    layout::Record,
    ops::OperationKind,
    store::GlobalStore,
    view::ListView,
};

///
/// ListClient
///
/// Typed calls over a host. Builds the positional arguments each operation
/// expects and submits every call on its own.
///

pub struct ListClient<S: GlobalStore> {
    host: Host<S>,
}

impl<S: GlobalStore> ListClient<S> {
    #[must_use]
    pub const fn new(host: Host<S>) -> Self {
        Self { host }
    }

    #[must_use]
    pub const fn host(&self) -> &Host<S> {
        &self.host
    }

    pub const fn host_mut(&mut self) -> &mut Host<S> {
        &mut self.host
    }

    #[must_use]
    pub fn into_host(self) -> Host<S> {
        self.host
    }

    /// Create the application instance.
    pub fn create(&mut self) -> Result<CallReceipt, Error> {
        Ok(self.host.submit(AppCall::create())?)
    }

    pub fn add(&mut self, record: Record) -> Result<CallReceipt, Error> {
        let mut args = vec![OperationKind::Add.tag().to_vec()];
        args.extend(record.into_values());

        self.noop(args)
    }

    pub fn update(&mut self, index: u64, record: Record) -> Result<CallReceipt, Error> {
        let mut args = vec![
            OperationKind::Update.tag().to_vec(),
            encode_index(index).to_vec(),
        ];
        args.extend(record.into_values());

        self.noop(args)
    }

    pub fn remove(&mut self, index: u64) -> Result<CallReceipt, Error> {
        self.noop(vec![
            OperationKind::Remove.tag().to_vec(),
            encode_index(index).to_vec(),
        ])
    }

    pub fn clear_all(&mut self) -> Result<CallReceipt, Error> {
        self.noop(vec![OperationKind::ClearAll.tag().to_vec()])
    }

    /// Current list contents.
    pub fn items(&self) -> Result<ListView, Error> {
        Ok(self.host.view()?)
    }

    fn noop(&mut self, args: Vec<Vec<u8>>) -> Result<CallReceipt, Error> {
        let app_id = self.host.app_id().ok_or_else(|| {
            Error::new(
                ErrorKind::Rejected(RejectKind::Lifecycle),
                ErrorOrigin::Host,
                "application has not been created",
            )
        })?;

        Ok(self.host.submit(AppCall::noop(app_id, args))?)
    }
}

///
/// TESTS
///
