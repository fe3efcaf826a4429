mod common;

use chrono::Duration;
use common::{setup, start, units};
use savings_ledger::{AccountId, Error, ErrorKind};

#[test]
fn test_emergency_stop_blocks_every_mutation() {
    let f = setup();
    let admin = f.ledger.config().administrator;
    let a = AccountId(20);
    f.ledger.deposit(a, units(4)).unwrap();
    f.ledger.request_withdrawal(a, units(1)).unwrap();
    f.clock.advance(Duration::days(7));
    let before = f.ledger.statistics();

    assert!(f.ledger.toggle_emergency_stop(admin).unwrap());

    let deadline = start() + Duration::days(60);
    let results = vec![
        f.ledger.deposit(a, units(1)).map(|_| ()),
        f.ledger.request_withdrawal(a, units(1)).map(|_| ()),
        f.ledger.execute_withdrawal(a).map(|_| ()),
        f.ledger.set_goal(a, units(10), deadline, "blocked").map(|_| ()),
        f.ledger.lock_goal(a),
        f.ledger.add_partner(a, AccountId(21)),
    ];
    for result in results {
        let err = result.unwrap_err();
        assert!(matches!(err, Error::EmergencyStopActive));
        assert_eq!(err.kind(), ErrorKind::State);
    }

    // Reads stay available.
    assert_eq!(f.ledger.get_balance(a), units(4));
    assert!(f.ledger.get_withdrawal_request(a, a).unwrap().is_some());

    assert!(!f.ledger.toggle_emergency_stop(admin).unwrap());
    assert_eq!(f.ledger.statistics(), before);
    assert_eq!(f.ledger.execute_withdrawal(a).unwrap(), units(1));
}

#[test]
fn test_non_admin_cannot_toggle() {
    let f = setup();
    let err = f.ledger.toggle_emergency_stop(AccountId(99)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert!(!f.ledger.is_emergency_stopped());
}
