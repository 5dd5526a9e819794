//! Built-in pattern table
//!
//! Groups exist for readers only; matching walks the flattened slice from top
//! to bottom and the first hit wins. Keep narrow, high-severity triggers above
//! the broad "X ... failed" catch-alls that would otherwise shadow them.

use logguard_core::Category::{
    self, ApplicationError, CriticalError, NetworkIssue, ResourceWarning, SecurityAlert,
    SystemNotification, UserAction, WebError, WebSuccess,
};

/// `(trigger, label)` pairs in precedence order
pub const DEFAULT_RULES: &[(&str, Category)] = &[
    // Security & access
    (r"Unauthorized access|Access denied|Permission denied", SecurityAlert),
    (r"Brute-force|Login attempt failed|Too many login attempts", SecurityAlert),
    (r"Password (reset|changed|expired)|Credentials updated", SecurityAlert),
    (r"SQL Injection|Cross-site scripting|XSS|Exploit", SecurityAlert),
    (r"Firewall (blocked|dropped)|Port scan detected", SecurityAlert),
    (r"SSH login failure|Invalid SSH key", SecurityAlert),
    // Database & storage
    (r"Database (connection|query|pool) (failed|refused|timeout|error|closed)", CriticalError),
    (r"Deadlock detected|Transaction aborted|Integrity constraint", CriticalError),
    (r"MongoDB|MySQL|PostgreSQL|Redis|Oracle (Error|Down)", CriticalError),
    (r"Disk (full|quota exceeded)|No space left on device", ResourceWarning),
    (r"I/O error|Read-only file system|Corrupt block", CriticalError),
    (r"Migration (failed|aborted)|Schema mismatch", SystemNotification),
    // Web & network
    (r"returned [45]\d{2}", WebError),
    (r"returned [23]\d{2}", WebSuccess),
    (r"DNS (lookup|resolution) failed|Host unreachable", NetworkIssue),
    (r"Connection (timed out|reset|refused by peer)", NetworkIssue),
    (r"Gateway Timeout|Bad Gateway|Proxy Error", WebError),
    (r"SSL (certificate|handshake) (failed|expired|invalid)", SecurityAlert),
    (r"API (Rate limit|Throttled|Quota exceeded)", ResourceWarning),
    // System & hardware
    (r"Memory usage (high|critical)|Out of memory|OOM killer", ResourceWarning),
    (r"CPU (load|temperature) (high|exceeded)|Thermal throttling", ResourceWarning),
    (r"Kernel panic|Segmentation fault|Core dumped", CriticalError),
    (r"Service (started|stopped|restarted|crashed)", SystemNotification),
    (r"System updated to version|Patch applied", SystemNotification),
    (r"Hardware failure|Fan speed low|Voltage drop", CriticalError),
    // User actions
    (r"User User\d+ logged (in|out)|Session (started|ended)", UserAction),
    (r"Account (created|deleted|suspended|activated)", UserAction),
    (r"File (uploaded|downloaded|deleted|moved)", UserAction),
    (r"Backup (started|ended|failed|completed)", SystemNotification),
    (r"Task (queued|processing|finished|retrying)", SystemNotification),
    (r"Payment (processed|failed|refunded)|Order #\d+", UserAction),
    // Application failures. The storage-backed creation failure must stay
    // ahead of the generic "cannot be created" family.
    (r"cannot be created: (DB|Database|SQL|Timeout)", CriticalError),
    (r"(User|Account|Profile) .* (cannot|failed to) be created", ApplicationError),
    (r"Validation failed for user creation", ApplicationError),
    (r"(User|Account|Profile) .* (cannot|failed|unable)", ApplicationError),
    (r"(User|Account|Profile) .* (created|registered|signed up)", UserAction),
    (r"Database (connection|query|pool) (failed|refused|timeout)", CriticalError),
    (r"(User|Account|Profile|Task) .* (cannot|failed|unable|error|rejected)", ApplicationError),
    (r"Validation (failed|error)|Invalid (input|credentials)", ApplicationError),
    (r"Unauthorized|Access denied|Brute-force|SQL Injection", SecurityAlert),
    (r"JWT (expired|invalid)|MFA failure", SecurityAlert),
    (r"Account (created|registered|activated|signed up)", UserAction),
    (r"File (uploaded|downloaded|moved)", UserAction),
    (r"Payment (processed|completed)|Order #\d+", UserAction),
    (r"Backup (started|completed)|Task (finished|queued)", SystemNotification),
    (r"Service (started|restarted)", SystemNotification),
    // Web services & API
    (r"GraphQL (query|mutation) (failed|invalid)", ApplicationError),
    (r"CORS (policy|origin) (blocked|rejected)", SecurityAlert),
    (r"Webhook (delivery failed|retry limit)", SystemNotification),
    (r"Request body too large|413 Payload", ResourceWarning),
    (r"429 Too Many Requests|Rate limit", ResourceWarning),
    // IAM & auth
    (r"JWT (expired|invalid|malformed)", SecurityAlert),
    (r"OAuth (error|callback failed)", SecurityAlert),
    (r"LDAP (bind failed|unreachable)", CriticalError),
    (r"User (locked out|disabled)|MFA failure", SecurityAlert),
    // Messaging queues
    (r"Kafka (broker disconnected|rebalance)", CriticalError),
    (r"RabbitMQ (queue full|consumer timeout)", ResourceWarning),
    (r"Pub/Sub (ack deadline|retry)", SystemNotification),
    (r"Buffer overflow|Message dropped", ResourceWarning),
    // Frontend & client
    (r"React (hydration failed|boundary error)", ApplicationError),
    (r"ChunkLoadError|Script error", ApplicationError),
    (r"Local storage (full|denied)", SystemNotification),
    // Audit & compliance
    (r"Sensitive data detected|PII leak", SecurityAlert),
    (r"Audit log (tampering|gap)", SecurityAlert),
    (r"GDPR (deletion|export) (started|completed)", UserAction),
    (r"Insecure protocol|Weak cipher", SecurityAlert),
    // OS & network internals
    (r"Out of file descriptors|ulimit reached", CriticalError),
    (r"Zombie process detected|PID limit reached", ResourceWarning),
    (r"Network interface (down|flap|saturated)", NetworkIssue),
    (r"Packet loss > \d+%|High latency detected", NetworkIssue),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_patterns_are_unique() {
        let mut seen = HashSet::new();
        for (pattern, _) in DEFAULT_RULES {
            assert!(seen.insert(*pattern), "repeated pattern {}", pattern);
        }
    }

    #[test]
    fn test_no_reserved_labels() {
        assert!(DEFAULT_RULES.iter().all(|(_, label)| label.is_assignable()));
    }
}
