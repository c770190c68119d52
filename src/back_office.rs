//! High-level back-office actions.
//!
//! Combines the low-level HTTP client with the lookup normalization, the
//! [`BankDetailsEditor`] and the [`FeeConfigurationManager`] to provide the
//! operations of the merchant registration and PIX review screens.
//!
//! Each [`Action`] may only have one request in flight; starting the same
//! action again before the first one finished fails with
//! [`YooPayError::Busy`].

use core::sync::atomic::{AtomicBool, Ordering};

use crate::editor::BankDetailsEditor;
use crate::error::{Result, YooPayError};
use crate::fees::FeeConfigurationManager;
use crate::models::{BlocklistEntry, MerchantId, MerchantProfile, WeekendPayoutStatus};

/// A user-triggered operation that is guarded against re-submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Merchant search.
    Lookup,
    /// Bank details save (and its confirmation lookup).
    SaveBankDetails,
    /// PIX fee enable or disable.
    Fee,
    /// PIX validation listing and review.
    PixValidation,
}

impl Action {
    /// Returns the action name used in logs and [`YooPayError::Busy`].
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lookup => "merchant lookup",
            Self::SaveBankDetails => "bank details save",
            Self::Fee => "fee update",
            Self::PixValidation => "PIX validation review",
        }
    }
}

/// In-flight flag of one action.
#[derive(Debug, Default)]
struct ActionGuard(AtomicBool);

/// Marks an action as in flight until dropped.
#[derive(Debug)]
struct InFlight<'guard>(&'guard AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ActionGuard {
    /// Marks the action as in flight.
    fn enter(&self, action: Action) -> Result<InFlight<'_>> {
        if self
            .0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(action = action.name(), "rejected re-submission");
            return Err(YooPayError::Busy(action.name()));
        }
        Ok(InFlight(&self.0))
    }

    /// Returns `true` while the action is in flight.
    fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// One guard per [`Action`].
#[derive(Debug, Default)]
struct ActionGuards {
    /// [`Action::Lookup`].
    lookup: ActionGuard,
    /// [`Action::SaveBankDetails`].
    save_bank_details: ActionGuard,
    /// [`Action::Fee`].
    fee: ActionGuard,
    /// [`Action::PixValidation`].
    pix_validation: ActionGuard,
}

impl ActionGuards {
    /// Returns the guard of `action`.
    const fn get(&self, action: Action) -> &ActionGuard {
        match action {
            Action::Lookup => &self.lookup,
            Action::SaveBankDetails => &self.save_bank_details,
            Action::Fee => &self.fee,
            Action::PixValidation => &self.pix_validation,
        }
    }

    /// Marks `action` as in flight.
    fn enter(&self, action: Action) -> Result<InFlight<'_>> {
        self.get(action).enter(action)
    }
}

/// Everything the registration screen shows after a successful lookup.
///
/// A new lookup produces a new value; nothing is carried over.
#[derive(Debug, Clone, PartialEq)]
pub struct MerchantScreen {
    /// Normalized merchant record.
    pub profile: MerchantProfile,
    /// Weekend payout eligibility.
    pub weekend_payout: WeekendPayoutStatus,
    /// Bank details form.
    pub bank_editor: BankDetailsEditor,
    /// PIX fee panel.
    pub fees: FeeConfigurationManager,
}

impl MerchantScreen {
    /// Assembles the screen state for `id`.
    #[inline]
    #[must_use]
    pub fn new(
        id: &MerchantId,
        profile: MerchantProfile,
        weekend_payout: WeekendPayoutStatus,
    ) -> Self {
        Self {
            bank_editor: BankDetailsEditor::from_profile(id.clone(), &profile),
            fees: FeeConfigurationManager::from_profile(id.clone(), &profile),
            profile,
            weekend_payout,
        }
    }
}

/// Maps a failed blocklist lookup to [`WeekendPayoutStatus::Unknown`].
fn payout_status_or_unknown(
    id: &MerchantId,
    result: Result<Option<BlocklistEntry>>,
) -> WeekendPayoutStatus {
    match result {
        Ok(entry) => WeekendPayoutStatus::from_blocklist(entry.as_ref()),
        Err(err) => {
            tracing::warn!(merchant_id = %id, error = %err, "weekend payout check failed");
            WeekendPayoutStatus::Unknown
        }
    }
}

/// Generates a high-level back-office client (async or blocking).
macro_rules! define_back_office {
    (
        client_name: $client:ident,
        http_client: $http_client:ty,
        http_builder: $http_builder:ty,
        client_doc: $client_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client {
            /// Low-level HTTP client.
            client: $http_client,
            /// In-flight flags.
            guards: ActionGuards,
        }

        impl $client {
            /// Wraps an already configured HTTP client.
            #[inline]
            #[must_use]
            pub fn new(client: $http_client) -> Self {
                Self {
                    client,
                    guards: ActionGuards::default(),
                }
            }

            /// Builds the HTTP client from `config` and wraps it.
            ///
            /// # Errors
            ///
            /// Returns [`YooPayError::Config`] if a URL in `config` is
            /// unusable, or [`YooPayError::Http`] if the HTTP client fails to
            /// build.
            #[inline]
            pub fn from_config(config: &ApiConfig) -> Result<Self> {
                let client = <$http_builder>::from_config(config).build()?;
                Ok(Self::new(client))
            }

            /// Returns the underlying HTTP client.
            #[inline]
            #[must_use]
            pub const fn client(&self) -> &$http_client {
                &self.client
            }

            /// Returns `true` while `action` has a request in flight.
            #[inline]
            #[must_use]
            pub fn is_busy(&self, action: Action) -> bool {
                self.guards.get(action).is_active()
            }

            /// Looks a merchant up by the identifier typed by staff.
            ///
            /// # Errors
            ///
            /// Returns [`YooPayError::Validation`] for a blank identifier (no
            /// request is made), [`YooPayError::NotFound`] if no record
            /// matches, [`YooPayError::Busy`] if a lookup is already running,
            /// or the transport error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn lookup(&self, raw_id: &str) -> Result<MerchantProfile> {
                let id = MerchantId::parse(raw_id)?;
                let _in_flight = self.guards.enter(Action::Lookup)?;
                self.fetch_profile(&id) $( .$await_ext )?
            }

            /// Looks a merchant up and, on success, checks weekend payout
            /// eligibility and prepares the editable panels.
            ///
            /// # Errors
            ///
            /// Same as [`Self::lookup`]. A failed payout check does not fail
            /// the call; it yields [`WeekendPayoutStatus::Unknown`].
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn open_merchant(&self, raw_id: &str) -> Result<MerchantScreen> {
                let id = MerchantId::parse(raw_id)?;
                let profile = {
                    let _in_flight = self.guards.enter(Action::Lookup)?;
                    self.fetch_profile(&id) $( .$await_ext )? ?
                };
                let weekend_payout = self.weekend_payout_status(&id) $( .$await_ext )?;
                Ok(MerchantScreen::new(&id, profile, weekend_payout))
            }

            /// Checks whether a merchant receives payouts on weekends.
            ///
            /// Never fails: any error is logged and reported as
            /// [`WeekendPayoutStatus::Unknown`].
            #[inline]
            #[tracing::instrument(skip_all, fields(merchant_id = %id))]
            pub $($async_kw)? fn weekend_payout_status(&self, id: &MerchantId) -> WeekendPayoutStatus {
                let result = self.client.weekend_payout_blocklist(id) $( .$await_ext )?;
                payout_status_or_unknown(id, result)
            }

            /// Saves the editor's draft, then reloads the editor from a fresh
            /// lookup.
            ///
            /// Returns the refreshed profile.
            ///
            /// # Errors
            ///
            /// Returns [`YooPayError::SaveFailed`] wrapping the cause if the
            /// save is rejected or cannot be sent. If the save succeeded but
            /// the confirmation lookup fails, that lookup's error is returned
            /// as is and the editor keeps its draft.
            #[inline]
            #[tracing::instrument(skip_all, fields(merchant_id = %editor.merchant_id()))]
            pub $($async_kw)? fn save_bank_details(
                &self,
                editor: &mut BankDetailsEditor,
            ) -> Result<MerchantProfile> {
                let _in_flight = self.guards.enter(Action::SaveBankDetails)?;
                let request = editor.to_request();
                if let Err(err) = self.client.save_banking(&request) $( .$await_ext )? {
                    tracing::warn!(error = %err, "saving bank details failed");
                    return Err(YooPayError::SaveFailed(Box::new(err)));
                }
                tracing::debug!("bank details saved, reloading merchant");
                let profile = self.fetch_profile(editor.merchant_id()) $( .$await_ext )? ?;
                editor.reload(&profile);
                Ok(profile)
            }

            /// Enables PIX with the fee entered in `manager`.
            ///
            /// The manager only changes state after the server accepted the
            /// request.
            ///
            /// # Errors
            ///
            /// Returns [`YooPayError::Validation`] if no fee value was
            /// entered, [`YooPayError::Busy`] if a fee update is running, or
            /// the transport error.
            #[inline]
            #[tracing::instrument(skip_all, fields(merchant_id = %manager.merchant_id()))]
            pub $($async_kw)? fn enable_fee(&self, manager: &mut FeeConfigurationManager) -> Result<()> {
                let request = manager.enable_request()?;
                let _in_flight = self.guards.enter(Action::Fee)?;
                self.client.submit_marketplace_fees(&request) $( .$await_ext )? ?;
                manager.confirm_enabled(&request);
                tracing::debug!("PIX fee enabled");
                Ok(())
            }

            /// Disables PIX for the merchant of `manager`.
            ///
            /// On failure the manager stays enabled.
            ///
            /// # Errors
            ///
            /// Returns [`YooPayError::Validation`] if PIX is already disabled,
            /// [`YooPayError::Busy`] if a fee update is running, or the
            /// transport error.
            #[inline]
            #[tracing::instrument(skip_all, fields(merchant_id = %manager.merchant_id()))]
            pub $($async_kw)? fn disable_fee(&self, manager: &mut FeeConfigurationManager) -> Result<()> {
                let driver = manager.disable_target()?;
                let _in_flight = self.guards.enter(Action::Fee)?;
                self.client
                    .disable_driver(manager.merchant_id(), driver)
                    $( .$await_ext )? ?;
                manager.confirm_disabled();
                tracing::debug!(driver = %driver, "PIX fee disabled");
                Ok(())
            }

            /// Lists PIX validation requests waiting for review.
            ///
            /// # Errors
            ///
            /// Returns [`YooPayError::Busy`] if a review action is running, or
            /// the transport error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn pending_pix_validations(&self) -> Result<Vec<PixValidationRequest>> {
                let _in_flight = self.guards.enter(Action::PixValidation)?;
                self.client.pending_validations() $( .$await_ext )?
            }

            /// Approves a PIX validation request and returns the refreshed
            /// pending list.
            ///
            /// # Errors
            ///
            /// Returns [`YooPayError::Busy`] if a review action is running, or
            /// the transport error of either call.
            #[inline]
            #[tracing::instrument(skip_all, fields(request_id = %id))]
            pub $($async_kw)? fn approve_pix_validation(
                &self,
                id: ValidationRequestId,
            ) -> Result<Vec<PixValidationRequest>> {
                let _in_flight = self.guards.enter(Action::PixValidation)?;
                self.client.approve_validation(id) $( .$await_ext )? ?;
                self.client.pending_validations() $( .$await_ext )?
            }

            /// Rejects a PIX validation request and returns the refreshed
            /// pending list.
            ///
            /// # Errors
            ///
            /// Returns [`YooPayError::Busy`] if a review action is running, or
            /// the transport error of either call.
            #[inline]
            #[tracing::instrument(skip_all, fields(request_id = %id))]
            pub $($async_kw)? fn reject_pix_validation(
                &self,
                id: ValidationRequestId,
            ) -> Result<Vec<PixValidationRequest>> {
                let _in_flight = self.guards.enter(Action::PixValidation)?;
                self.client.reject_validation(id) $( .$await_ext )? ?;
                self.client.pending_validations() $( .$await_ext )?
            }

            /// Fetches and normalizes the merchant record, without guarding.
            $($async_kw)? fn fetch_profile(&self, id: &MerchantId) -> Result<MerchantProfile> {
                let body = self.client.marketplace_list(id) $( .$await_ext )? ?;
                lookup::resolve(&body, id)
            }
        }
    };
}

#[cfg(feature = "async")]
mod async_back_office {
    //! Async back-office client.

    use super::{Action, ActionGuards, MerchantScreen, payout_status_or_unknown};
    use crate::client::{YooPayClient, YooPayClientBuilder};
    use crate::config::ApiConfig;
    use crate::editor::BankDetailsEditor;
    use crate::error::{Result, YooPayError};
    use crate::fees::FeeConfigurationManager;
    use crate::lookup;
    use crate::models::{
        MerchantId, MerchantProfile, PixValidationRequest, ValidationRequestId, WeekendPayoutStatus,
    };

    define_back_office! {
        client_name: BackOffice,
        http_client: YooPayClient,
        http_builder: YooPayClientBuilder,
        client_doc: "High-level async back-office client.\n\nUse [`BackOffice::from_config()`] or [`BackOffice::new()`] to construct an instance.",
        async_kw: async,
        await_kw: await,
    }
}

// ── Blocking variant ────────────────────────────────────────────────────

#[cfg(feature = "blocking")]
mod blocking_back_office {
    //! Blocking back-office client.

    use super::{Action, ActionGuards, MerchantScreen, payout_status_or_unknown};
    use crate::client::{YooPayBlockingClient, YooPayBlockingClientBuilder};
    use crate::config::ApiConfig;
    use crate::editor::BankDetailsEditor;
    use crate::error::{Result, YooPayError};
    use crate::fees::FeeConfigurationManager;
    use crate::lookup;
    use crate::models::{
        MerchantId, MerchantProfile, PixValidationRequest, ValidationRequestId, WeekendPayoutStatus,
    };

    define_back_office! {
        client_name: BackOfficeBlocking,
        http_client: YooPayBlockingClient,
        http_builder: YooPayBlockingClientBuilder,
        client_doc: "High-level blocking back-office client.\n\nUse [`BackOfficeBlocking::from_config()`] or [`BackOfficeBlocking::new()`] to construct an instance.",
    }
}

#[cfg(feature = "async")]
pub use async_back_office::BackOffice;
#[cfg(feature = "blocking")]
pub use blocking_back_office::BackOfficeBlocking;


#[cfg(all(test, feature = "async"))]
mod http_tests;
