//! Service unit tests against an in-memory recording repository.

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use ledger_types::{
        Account, AccountCreation, AccountId, AccountRepository, AppError, ConstraintKind,
        ErrorKind, OperationType, RepoError, Transaction, TransactionCreation, TransactionId,
        TransactionRepository, TransactionScope,
    };

    use crate::{AccountService, RequestContext, TransactionService};

    #[derive(Default)]
    struct Store {
        accounts: Vec<Account>,
        transactions: Vec<Transaction>,
        next_account_id: i64,
        next_transaction_id: i64,
    }

    #[derive(Default)]
    struct Counters {
        begins: AtomicUsize,
        commits: AtomicUsize,
        rollbacks: AtomicUsize,
        abandoned: AtomicUsize,
    }

    /// In-memory repository whose writes are staged per transaction and only
    /// become visible on commit. Records every scope call.
    pub struct MemoryRepo {
        store: Arc<Mutex<Store>>,
        counters: Arc<Counters>,
        write_delay: Option<Duration>,
        failure: Mutex<Option<RepoError>>,
    }

    pub struct MemoryTx {
        counters: Arc<Counters>,
        accounts: Vec<Account>,
        transactions: Vec<Transaction>,
        finished: bool,
    }

    impl Drop for MemoryTx {
        fn drop(&mut self) {
            if !self.finished {
                self.counters.abandoned.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    impl MemoryRepo {
        pub fn new() -> Self {
            Self {
                store: Arc::new(Mutex::new(Store::default())),
                counters: Arc::new(Counters::default()),
                write_delay: None,
                failure: Mutex::new(None),
            }
        }

        /// Every repository call sleeps for `delay` before touching the store.
        pub fn with_write_delay(mut self, delay: Duration) -> Self {
            self.write_delay = Some(delay);
            self
        }

        /// The next repository call fails with `err`.
        pub fn fail_next(&self, err: RepoError) {
            *self.failure.lock().unwrap() = Some(err);
        }

        pub fn begins(&self) -> usize {
            self.counters.begins.load(Ordering::SeqCst)
        }

        pub fn commits(&self) -> usize {
            self.counters.commits.load(Ordering::SeqCst)
        }

        pub fn rollbacks(&self) -> usize {
            self.counters.rollbacks.load(Ordering::SeqCst)
        }

        pub fn abandoned(&self) -> usize {
            self.counters.abandoned.load(Ordering::SeqCst)
        }

        pub fn committed_accounts(&self) -> Vec<Account> {
            self.store.lock().unwrap().accounts.clone()
        }

        pub fn committed_transactions(&self) -> Vec<Transaction> {
            self.store.lock().unwrap().transactions.clone()
        }

        async fn before_call(&self) -> Result<(), RepoError> {
            if let Some(delay) = self.write_delay {
                tokio::time::sleep(delay).await;
            }
            let failure = self.failure.lock().unwrap().take();
            match failure {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl TransactionScope for MemoryRepo {
        type Tx = MemoryTx;

        async fn begin(&self) -> Result<Self::Tx, RepoError> {
            self.counters.begins.fetch_add(1, Ordering::SeqCst);
            Ok(MemoryTx {
                counters: Arc::clone(&self.counters),
                accounts: Vec::new(),
                transactions: Vec::new(),
                finished: false,
            })
        }

        async fn commit(&self, mut tx: Self::Tx) -> Result<(), RepoError> {
            tx.finished = true;
            let mut store = self.store.lock().unwrap();
            store.accounts.append(&mut tx.accounts);
            store.transactions.append(&mut tx.transactions);
            self.counters.commits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn rollback(&self, mut tx: Self::Tx) -> Result<(), RepoError> {
            tx.finished = true;
            self.counters.rollbacks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl AccountRepository for MemoryRepo {
        async fn create_account(
            &self,
            tx: &mut Self::Tx,
            creation: &AccountCreation,
        ) -> Result<Account, RepoError> {
            self.before_call().await?;
            let mut store = self.store.lock().unwrap();

            let taken = store
                .accounts
                .iter()
                .chain(tx.accounts.iter())
                .any(|a| a.document_number == creation.document_number);
            if taken {
                return Err(RepoError::Constraint {
                    kind: ConstraintKind::Unique,
                    constraint: Some("accounts_document_number_key".into()),
                    message: "duplicate document number".into(),
                });
            }

            store.next_account_id += 1;
            let account = Account::from_parts(
                AccountId::new(store.next_account_id),
                creation.document_number.clone(),
            );
            tx.accounts.push(account.clone());
            Ok(account)
        }

        async fn get_account_by_id(&self, id: AccountId) -> Result<Account, RepoError> {
            self.before_call().await?;
            self.store
                .lock()
                .unwrap()
                .accounts
                .iter()
                .find(|a| a.id == id)
                .cloned()
                .ok_or(RepoError::NotFound)
        }
    }

    #[async_trait]
    impl TransactionRepository for MemoryRepo {
        async fn create_transaction(
            &self,
            tx: &mut Self::Tx,
            creation: &TransactionCreation,
        ) -> Result<Transaction, RepoError> {
            self.before_call().await?;
            let mut store = self.store.lock().unwrap();

            let account_exists = store
                .accounts
                .iter()
                .chain(tx.accounts.iter())
                .any(|a| a.id == creation.account_id);
            if !account_exists {
                return Err(RepoError::Constraint {
                    kind: ConstraintKind::ForeignKey,
                    constraint: Some("transactions_account_id_fkey".into()),
                    message: "account does not exist".into(),
                });
            }

            store.next_transaction_id += 1;
            let created = Transaction::from_parts(
                TransactionId::new(store.next_transaction_id),
                creation.account_id,
                creation.operation_type,
                creation.amount,
                chrono::Utc::now(),
            );
            tx.transactions.push(created.clone());
            Ok(created)
        }
    }

    pub fn services() -> (
        Arc<MemoryRepo>,
        AccountService<MemoryRepo>,
        TransactionService<MemoryRepo>,
    ) {
        services_with(MemoryRepo::new())
    }

    fn services_with(
        repo: MemoryRepo,
    ) -> (
        Arc<MemoryRepo>,
        AccountService<MemoryRepo>,
        TransactionService<MemoryRepo>,
    ) {
        let repo = Arc::new(repo);
        (
            Arc::clone(&repo),
            AccountService::new(Arc::clone(&repo)),
            TransactionService::new(repo),
        )
    }

    async fn open_account(accounts: &AccountService<MemoryRepo>, document_number: &str) -> Account {
        accounts
            .create_account(&RequestContext::generate(), AccountCreation::new(document_number))
            .await
            .unwrap()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accounts
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_account_success() {
        let (repo, accounts, _) = services();

        let account = open_account(&accounts, "12345678900").await;

        assert!(account.id.get() > 0);
        assert_eq!(account.document_number, "12345678900");
        assert_eq!(repo.begins(), 1);
        assert_eq!(repo.commits(), 1);
        assert_eq!(repo.rollbacks(), 0);
        assert_eq!(repo.committed_accounts(), vec![account]);
    }

    #[tokio::test]
    async fn test_duplicate_document_number_fails() {
        let (repo, accounts, _) = services();
        let ctx = RequestContext::generate();

        for document_number in ["1", "abc", "12345678900"] {
            open_account(&accounts, document_number).await;

            let err = accounts
                .create_account(&ctx, AccountCreation::new(document_number))
                .await
                .unwrap_err();

            assert!(err.is(ErrorKind::Duplicate), "unexpected error: {err:?}");
            let AppError::Domain(domain) = &err else {
                panic!("expected a domain error, got {err:?}");
            };
            assert!(domain.context().contains(document_number));
            assert!(domain.cause().is_some_and(RepoError::is_unique_violation));
        }

        assert_eq!(repo.committed_accounts().len(), 3);
        assert_eq!(repo.rollbacks(), 3);
    }

    #[tokio::test]
    async fn test_get_account_by_id() {
        let (repo, accounts, _) = services();
        let created = open_account(&accounts, "abc").await;

        let fetched = accounts
            .get_account_by_id(&RequestContext::generate(), created.id)
            .await
            .unwrap();

        assert_eq!(fetched, created);
        assert_eq!(repo.begins(), 1);
    }

    #[tokio::test]
    async fn test_get_account_unknown_id_is_not_found() {
        let (repo, accounts, _) = services();
        let ctx = RequestContext::generate();

        for id in [1, 7, 9999, -3] {
            let err = accounts
                .get_account_by_id(&ctx, AccountId::new(id))
                .await
                .unwrap_err();
            assert!(err.is(ErrorKind::NotFound));
            assert!(err.to_string().contains(&format!("account {id}")));
        }

        assert_eq!(repo.begins(), 0);
    }

    #[tokio::test]
    async fn test_get_account_storage_error_passes_through() {
        let (repo, accounts, _) = services();
        repo.fail_next(RepoError::Database("connection reset".into()));

        let err = accounts
            .get_account_by_id(&RequestContext::generate(), AccountId::new(1))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage(RepoError::Database(_))));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_debits_persist_negative_amount() {
        let (repo, accounts, transactions) = services();
        let account = open_account(&accounts, "1").await;
        let ctx = RequestContext::generate();

        for op in [
            OperationType::Purchase,
            OperationType::InstallmentPurchase,
            OperationType::Withdrawal,
        ] {
            let created = transactions
                .create_transaction(&ctx, TransactionCreation::new(account.id, op, 100.0))
                .await
                .unwrap();
            assert_eq!(created.amount, -100.0);
            assert_eq!(created.operation_type, op);
        }

        let amounts: Vec<f64> = repo.committed_transactions().iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![-100.0, -100.0, -100.0]);
    }

    #[tokio::test]
    async fn test_payment_persists_positive_amount() {
        let (repo, accounts, transactions) = services();
        let account = open_account(&accounts, "1").await;

        let created = transactions
            .create_transaction(
                &RequestContext::generate(),
                TransactionCreation::new(account.id, OperationType::Payment, 200.0),
            )
            .await
            .unwrap();

        assert_eq!(created.amount, 200.0);
        assert_eq!(created.account_id, account.id);
        assert_eq!(repo.committed_transactions(), vec![created]);
    }

    #[tokio::test]
    async fn test_unknown_operation_type_writes_nothing() {
        let (repo, accounts, transactions) = services();
        let account = open_account(&accounts, "1").await;
        let begins_before = repo.begins();

        let err = transactions
            .create_transaction(
                &RequestContext::generate(),
                TransactionCreation::new(account.id, OperationType::from_id(99), 10.0),
            )
            .await
            .unwrap_err();

        assert!(err.is(ErrorKind::InvalidOperationType));
        assert_eq!(repo.begins(), begins_before);
        assert!(repo.committed_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_amount_writes_nothing() {
        let (repo, accounts, transactions) = services();
        let account = open_account(&accounts, "1").await;
        let begins_before = repo.begins();

        for amount in [0.0, -25.0, f64::NAN] {
            let err = transactions
                .create_transaction(
                    &RequestContext::generate(),
                    TransactionCreation::new(account.id, OperationType::Purchase, amount),
                )
                .await
                .unwrap_err();
            assert!(err.is(ErrorKind::InvalidAmount));
        }

        assert_eq!(repo.begins(), begins_before);
        assert!(repo.committed_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_account_is_not_found_and_rolled_back() {
        let (repo, _, transactions) = services();

        let err = transactions
            .create_transaction(
                &RequestContext::generate(),
                TransactionCreation::new(AccountId::new(9999), OperationType::Purchase, 100.0),
            )
            .await
            .unwrap_err();

        assert!(err.is(ErrorKind::NotFound));
        let AppError::Domain(domain) = &err else {
            panic!("expected a domain error, got {err:?}");
        };
        assert_eq!(domain.context(), "account 9999");
        assert!(domain.cause().is_some_and(RepoError::is_foreign_key_violation));
        assert_eq!(repo.begins(), 1);
        assert_eq!(repo.rollbacks(), 1);
        assert_eq!(repo.commits(), 0);
        assert!(repo.committed_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_identical_transactions_create_new_rows() {
        let (repo, accounts, transactions) = services();
        let account = open_account(&accounts, "1").await;
        let ctx = RequestContext::generate();
        let creation = TransactionCreation::new(account.id, OperationType::Withdrawal, 5.0);

        let first = transactions
            .create_transaction(&ctx, creation.clone())
            .await
            .unwrap();
        let second = transactions
            .create_transaction(&ctx, creation)
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(repo.committed_transactions().len(), 2);
    }

    #[tokio::test]
    async fn test_storage_error_rolls_back_and_passes_through() {
        let (repo, accounts, transactions) = services();
        let account = open_account(&accounts, "1").await;
        repo.fail_next(RepoError::Database("disk full".into()));

        let err = transactions
            .create_transaction(
                &RequestContext::generate(),
                TransactionCreation::new(account.id, OperationType::Payment, 1.0),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage(RepoError::Database(_))));
        assert_eq!(err.kind(), None);
        assert_eq!(repo.rollbacks(), 1);
        assert!(repo.committed_transactions().is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Deadlines and cancellation
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_deadline_exceeded_rolls_back() {
        let (repo, accounts, _) =
            services_with(MemoryRepo::new().with_write_delay(Duration::from_millis(200)));
        let ctx = RequestContext::generate().with_timeout(Duration::from_millis(10));

        let err = accounts
            .create_account(&ctx, AccountCreation::new("slow"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Cancelled(_)));
        assert_eq!(repo.rollbacks(), 1);
        assert_eq!(repo.commits(), 0);
        assert!(repo.committed_accounts().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_call_abandons_transaction() {
        let (repo, accounts, _) =
            services_with(MemoryRepo::new().with_write_delay(Duration::from_millis(200)));
        let ctx = RequestContext::generate();

        let outcome = tokio::time::timeout(
            Duration::from_millis(10),
            accounts.create_account(&ctx, AccountCreation::new("gone")),
        )
        .await;

        assert!(outcome.is_err());
        assert_eq!(repo.begins(), 1);
        assert_eq!(repo.abandoned(), 1);
        assert_eq!(repo.commits(), 0);
        assert!(repo.committed_accounts().is_empty());
    }
}
