// Payment transaction operations

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::present;
use crate::error::ApiError;
use crate::models::{new_id, Transaction, TransactionStatus, User};
use crate::store::{keys, Records};

/// Platform commission withheld from each payment (2.5%)
pub const DEFAULT_COMMISSION_RATE: f64 = 0.025;

/// Fractional digits of the chain's native unit (ether → wei)
const WEI_DECIMALS: usize = 18;
const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransaction {
    pub gig_id: Option<String>,
    pub from_user_id: Option<String>,
    pub to_user_id: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTransaction {
    pub transaction_id: Option<String>,
    pub tx_hash: Option<String>,
}

/// Parameters for the on-chain transfer that settles a transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutParams {
    /// Payee wallet address
    pub to: String,
    /// Amount after commission, in whole units
    pub net_amount: f64,
    /// Amount after commission in wei, as a decimal string
    pub value: String,
}

pub fn calculate_commission(amount: f64, rate: f64) -> f64 {
    amount * rate
}

/// Convert a non-negative decimal amount into wei
///
/// Digits beyond the 18th fractional place are truncated.
pub fn to_wei(amount: f64) -> Option<u128> {
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    // f64 Display never switches to exponent notation
    let text = amount.abs().to_string();
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let whole: u128 = whole.parse().ok()?;
    let mut frac: String = frac.chars().take(WEI_DECIMALS).collect();
    while frac.len() < WEI_DECIMALS {
        frac.push('0');
    }
    let frac: u128 = frac.parse().ok()?;

    whole.checked_mul(WEI_PER_ETHER)?.checked_add(frac)
}

/// Transactions where `user_id` is payer or payee
pub async fn list_for_user(
    records: &Records,
    user_id: Option<String>,
) -> Result<Vec<Transaction>, ApiError> {
    let user_id = present(user_id).ok_or_else(|| ApiError::bad_request("userId required"))?;
    let all: Vec<Transaction> = records
        .scan(keys::TRANSACTION_PREFIX)
        .await
        .map_err(ApiError::store("Failed to fetch transactions"))?;
    Ok(all.into_iter().filter(|tx| tx.involves(&user_id)).collect())
}

/// Record a pending payment with commission withheld at `rate`
pub async fn create_transaction(
    records: &Records,
    req: CreateTransaction,
    rate: f64,
) -> Result<Transaction, ApiError> {
    let (Some(gig_id), Some(from_user_id), Some(to_user_id), Some(amount)) = (
        present(req.gig_id),
        present(req.from_user_id),
        present(req.to_user_id),
        req.amount,
    ) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    let transaction = Transaction {
        transaction_id: new_id(),
        gig_id,
        from_user_id,
        to_user_id,
        amount,
        commission: calculate_commission(amount, rate),
        status: TransactionStatus::Pending,
        tx_hash: None,
        created_at: Utc::now(),
        completed_at: None,
    };

    records
        .put(&keys::transaction(&transaction.transaction_id), &transaction)
        .await
        .map_err(ApiError::store("Failed to create transaction"))?;
    Ok(transaction)
}

/// Mark a transaction settled by the on-chain transfer `txHash`
pub async fn complete_transaction(
    records: &Records,
    req: CompleteTransaction,
) -> Result<Transaction, ApiError> {
    let (Some(transaction_id), Some(tx_hash)) = (present(req.transaction_id), present(req.tx_hash))
    else {
        return Err(ApiError::bad_request("transactionId and txHash required"));
    };
    let key = keys::transaction(&transaction_id);

    let mut transaction: Transaction = records
        .get(&key)
        .await
        .map_err(ApiError::store("Failed to update transaction"))?
        .ok_or(ApiError::NotFound("Transaction not found"))?;

    transaction.status = TransactionStatus::Completed;
    transaction.tx_hash = Some(tx_hash);
    transaction.completed_at = Some(Utc::now());

    records
        .put(&key, &transaction)
        .await
        .map_err(ApiError::store("Failed to update transaction"))?;
    Ok(transaction)
}

/// Build the transfer that pays the payee, net of commission
pub async fn payout_params(
    records: &Records,
    transaction_id: Option<String>,
    rate: f64,
) -> Result<PayoutParams, ApiError> {
    let transaction_id =
        present(transaction_id).ok_or_else(|| ApiError::bad_request("transactionId required"))?;

    let transaction: Transaction = records
        .get(&keys::transaction(&transaction_id))
        .await
        .map_err(ApiError::store("Failed to fetch transaction"))?
        .ok_or(ApiError::NotFound("Transaction not found"))?;

    let payee: User = records
        .get(&keys::user(&transaction.to_user_id))
        .await
        .map_err(ApiError::store("Failed to fetch user"))?
        .ok_or(ApiError::NotFound("User not found"))?;

    if !payee.wallet_address.starts_with("0x") {
        return Err(ApiError::bad_request("Payee wallet address must start with 0x"));
    }

    let net_amount = transaction.amount * (1.0 - rate);
    let value = to_wei(net_amount)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid payout amount: {net_amount}")))?;

    Ok(PayoutParams {
        to: payee.wallet_address,
        net_amount,
        value: value.to_string(),
    })
}
