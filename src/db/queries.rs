use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{
    Appointment, AppointmentStatus, BookingEvent, Customer, PaymentRecord, ServiceSelection,
    VehicleType,
};

// ── Appointments ──

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> anyhow::Result<()> {
    let (is_guest, user_id, customer_name, customer_email) = match &appt.customer {
        Customer::Registered { user_id, .. } => (0, Some(user_id.as_str()), None, None),
        Customer::Guest { name, email, .. } => {
            (1, None, Some(name.as_str()), Some(email.as_str()))
        }
    };
    let services_json = serde_json::to_string(&appt.services)?;
    let date = appt.date.format("%Y-%m-%d").to_string();
    let created_at = appt.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
    let updated_at = appt.updated_at.format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO appointments (id, is_guest, user_id, customer_name, customer_email, customer_phone,
            vehicle_type, services, date, time_slot, street, city, state, zip_code,
            estimated_price_cents, final_price_cents, deposit_cents, remaining_cents,
            payment_id, payment_method, payment_status, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)",
        params![
            appt.id,
            is_guest,
            user_id,
            customer_name,
            customer_email,
            appt.customer.phone(),
            appt.vehicle_type.as_str(),
            services_json,
            date,
            appt.time_slot,
            appt.address.street,
            appt.address.city,
            appt.address.state,
            appt.address.zip_code,
            appt.estimated_price_cents,
            appt.final_price_cents,
            appt.deposit_cents,
            appt.remaining_cents,
            appt.payment.id,
            appt.payment.method,
            appt.payment.status,
            appt.status.as_str(),
            created_at,
            updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_appointment_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Appointment>> {
    let result = conn.query_row(
        "SELECT id, is_guest, user_id, customer_name, customer_email, customer_phone,
            vehicle_type, services, date, time_slot, street, city, state, zip_code,
            estimated_price_cents, final_price_cents, deposit_cents, remaining_cents,
            payment_id, payment_method, payment_status, status, created_at, updated_at
         FROM appointments WHERE id = ?1",
        params![id],
        |row| Ok(parse_appointment_row(row)),
    );

    match result {
        Ok(appt) => Ok(Some(appt?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_appointment_by_payment_id(
    conn: &Connection,
    payment_id: &str,
) -> anyhow::Result<Option<Appointment>> {
    let result = conn.query_row(
        "SELECT id, is_guest, user_id, customer_name, customer_email, customer_phone,
            vehicle_type, services, date, time_slot, street, city, state, zip_code,
            estimated_price_cents, final_price_cents, deposit_cents, remaining_cents,
            payment_id, payment_method, payment_status, status, created_at, updated_at
         FROM appointments WHERE payment_id = ?1",
        params![payment_id],
        |row| Ok(parse_appointment_row(row)),
    );

    match result {
        Ok(appt) => Ok(Some(appt?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Active bookings holding a spot in one slot. Cancelled and rejected rows
/// have released theirs.
pub fn count_appointments_for_slot(
    conn: &Connection,
    date: NaiveDate,
    time_slot: &str,
) -> anyhow::Result<i64> {
    let date = date.format("%Y-%m-%d").to_string();
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM appointments
         WHERE date = ?1 AND time_slot = ?2 AND status NOT IN ('cancelled', 'rejected')",
        params![date, time_slot],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Per-slot tallies for a whole day, one query instead of five.
pub fn count_appointments_by_slot(
    conn: &Connection,
    date: NaiveDate,
) -> anyhow::Result<Vec<(String, i64)>> {
    let date = date.format("%Y-%m-%d").to_string();
    let mut stmt = conn.prepare(
        "SELECT time_slot, COUNT(*) FROM appointments
         WHERE date = ?1 AND status NOT IN ('cancelled', 'rejected')
         GROUP BY time_slot",
    )?;

    let rows = stmt.query_map(params![date], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut counts = vec![];
    for row in rows {
        counts.push(row?);
    }
    Ok(counts)
}

pub fn get_all_appointments(
    conn: &Connection,
    status_filter: Option<&str>,
    limit: i64,
) -> anyhow::Result<Vec<Appointment>> {
    let (sql, params_vec): (String, Vec<Box<dyn rusqlite::types::ToSql>>) = match status_filter {
        Some(status) => (
            "SELECT id, is_guest, user_id, customer_name, customer_email, customer_phone, \
                vehicle_type, services, date, time_slot, street, city, state, zip_code, \
                estimated_price_cents, final_price_cents, deposit_cents, remaining_cents, \
                payment_id, payment_method, payment_status, status, created_at, updated_at \
             FROM appointments WHERE status = ?1 ORDER BY date DESC, time_slot DESC LIMIT ?2"
                .to_string(),
            vec![
                Box::new(status.to_string()) as Box<dyn rusqlite::types::ToSql>,
                Box::new(limit),
            ],
        ),
        None => (
            "SELECT id, is_guest, user_id, customer_name, customer_email, customer_phone, \
                vehicle_type, services, date, time_slot, street, city, state, zip_code, \
                estimated_price_cents, final_price_cents, deposit_cents, remaining_cents, \
                payment_id, payment_method, payment_status, status, created_at, updated_at \
             FROM appointments ORDER BY date DESC, time_slot DESC LIMIT ?1"
                .to_string(),
            vec![Box::new(limit) as Box<dyn rusqlite::types::ToSql>],
        ),
    };

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_appointment_row(row)))?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

pub fn update_appointment_status(
    conn: &Connection,
    id: &str,
    status: AppointmentStatus,
) -> anyhow::Result<bool> {
    let now = Utc::now()
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let count = conn.execute(
        "UPDATE appointments SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now, id],
    )?;
    Ok(count > 0)
}

/// Processor webhooks address appointments by payment id, not our own.
pub fn set_payment_status(
    conn: &Connection,
    payment_id: &str,
    payment_status: &str,
) -> anyhow::Result<bool> {
    let now = Utc::now()
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let count = conn.execute(
        "UPDATE appointments SET payment_status = ?1, updated_at = ?2 WHERE payment_id = ?3",
        params![payment_status, now, payment_id],
    )?;
    Ok(count > 0)
}

fn parse_appointment_row(row: &rusqlite::Row) -> anyhow::Result<Appointment> {
    let id: String = row.get(0)?;
    let is_guest: bool = row.get::<_, i32>(1)? != 0;
    let user_id: Option<String> = row.get(2)?;
    let customer_name: Option<String> = row.get(3)?;
    let customer_email: Option<String> = row.get(4)?;
    let customer_phone: String = row.get(5)?;
    let vehicle_str: String = row.get(6)?;
    let services_json: String = row.get(7)?;
    let date_str: String = row.get(8)?;
    let time_slot: String = row.get(9)?;
    let street: String = row.get(10)?;
    let city: String = row.get(11)?;
    let state: String = row.get(12)?;
    let zip_code: String = row.get(13)?;
    let estimated_price_cents: i64 = row.get(14)?;
    let final_price_cents: i64 = row.get(15)?;
    let deposit_cents: i64 = row.get(16)?;
    let remaining_cents: i64 = row.get(17)?;
    let payment_id: String = row.get(18)?;
    let payment_method: String = row.get(19)?;
    let payment_status: String = row.get(20)?;
    let status_str: String = row.get(21)?;
    let created_at_str: String = row.get(22)?;
    let updated_at_str: String = row.get(23)?;

    let customer = if is_guest {
        Customer::Guest {
            name: customer_name.unwrap_or_default(),
            email: customer_email.unwrap_or_default(),
            phone: customer_phone,
        }
    } else {
        Customer::Registered {
            user_id: user_id.unwrap_or_default(),
            phone: customer_phone,
        }
    };

    let vehicle_type = VehicleType::parse(&vehicle_str)
        .ok_or_else(|| anyhow::anyhow!("unknown vehicle type in appointment {id}: {vehicle_str}"))?;
    let services: Vec<ServiceSelection> = serde_json::from_str(&services_json)?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")?;

    let created_at = NaiveDateTime::parse_from_str(&created_at_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at = NaiveDateTime::parse_from_str(&updated_at_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());

    Ok(Appointment {
        id,
        customer,
        services,
        vehicle_type,
        date,
        time_slot,
        address: crate::models::Address {
            street,
            city,
            state,
            zip_code,
        },
        estimated_price_cents,
        final_price_cents,
        deposit_cents,
        remaining_cents,
        payment: PaymentRecord {
            id: payment_id,
            method: payment_method,
            status: payment_status,
        },
        status: AppointmentStatus::parse(&status_str),
        created_at,
        updated_at,
    })
}

// ── Blocked Slots ──

pub struct BlockedSlot {
    pub date: String,
    pub time_slot: String,
    pub reason: Option<String>,
    pub created_at: String,
}

pub fn insert_blocked_slot(
    conn: &Connection,
    date: NaiveDate,
    time_slot: &str,
    reason: Option<&str>,
) -> anyhow::Result<()> {
    let date = date.format("%Y-%m-%d").to_string();
    conn.execute(
        "INSERT INTO blocked_slots (date, time_slot, reason) VALUES (?1, ?2, ?3)
         ON CONFLICT(date, time_slot) DO UPDATE SET reason = excluded.reason",
        params![date, time_slot, reason],
    )?;
    Ok(())
}

pub fn delete_blocked_slot(
    conn: &Connection,
    date: NaiveDate,
    time_slot: &str,
) -> anyhow::Result<bool> {
    let date = date.format("%Y-%m-%d").to_string();
    let count = conn.execute(
        "DELETE FROM blocked_slots WHERE date = ?1 AND time_slot = ?2",
        params![date, time_slot],
    )?;
    Ok(count > 0)
}

pub fn is_slot_blocked(
    conn: &Connection,
    date: NaiveDate,
    time_slot: &str,
) -> anyhow::Result<bool> {
    let date = date.format("%Y-%m-%d").to_string();
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM blocked_slots WHERE date = ?1 AND time_slot = ?2",
        params![date, time_slot],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn blocked_labels_for_date(conn: &Connection, date: NaiveDate) -> anyhow::Result<Vec<String>> {
    let date = date.format("%Y-%m-%d").to_string();
    let mut stmt = conn.prepare("SELECT time_slot FROM blocked_slots WHERE date = ?1")?;
    let rows = stmt.query_map(params![date], |row| row.get::<_, String>(0))?;

    let mut labels = vec![];
    for row in rows {
        labels.push(row?);
    }
    Ok(labels)
}

pub fn list_blocked_slots(
    conn: &Connection,
    date: Option<NaiveDate>,
) -> anyhow::Result<Vec<BlockedSlot>> {
    let map_row = |row: &rusqlite::Row| -> rusqlite::Result<BlockedSlot> {
        Ok(BlockedSlot {
            date: row.get(0)?,
            time_slot: row.get(1)?,
            reason: row.get(2)?,
            created_at: row.get(3)?,
        })
    };

    let mut blocked = vec![];
    match date {
        Some(d) => {
            let date = d.format("%Y-%m-%d").to_string();
            let mut stmt = conn.prepare(
                "SELECT date, time_slot, reason, created_at FROM blocked_slots
                 WHERE date = ?1 ORDER BY date, time_slot",
            )?;
            let rows = stmt.query_map(params![date], map_row)?;
            for row in rows {
                blocked.push(row?);
            }
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT date, time_slot, reason, created_at FROM blocked_slots
                 ORDER BY date, time_slot",
            )?;
            let rows = stmt.query_map([], map_row)?;
            for row in rows {
                blocked.push(row?);
            }
        }
    }
    Ok(blocked)
}

// ── Booking Events ──

pub fn insert_booking_event(
    conn: &Connection,
    appointment_id: &str,
    kind: &str,
    data: &str,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO booking_events (appointment_id, kind, data) VALUES (?1, ?2, ?3)",
        params![appointment_id, kind, data],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_events_since(conn: &Connection, since_id: i64) -> anyhow::Result<Vec<BookingEvent>> {
    let mut stmt = conn.prepare(
        "SELECT id, appointment_id, kind, data, created_at
         FROM booking_events WHERE id > ?1
         ORDER BY id ASC",
    )?;

    let rows = stmt.query_map(params![since_id], |row| {
        Ok(BookingEvent {
            id: row.get(0)?,
            appointment_id: row.get(1)?,
            kind: row.get(2)?,
            data: row.get(3)?,
            created_at: row.get(4)?,
        })
    })?;

    let mut events = vec![];
    for row in rows {
        events.push(row?);
    }
    Ok(events)
}

// ── Dashboard ──

pub struct DashboardStats {
    pub upcoming_count: i64,
    pub completed_count: i64,
    pub blocked_count: i64,
    pub deposits_collected_cents: i64,
    pub outstanding_balance_cents: i64,
}

pub fn get_dashboard_stats(conn: &Connection, today: NaiveDate) -> anyhow::Result<DashboardStats> {
    let today = today.format("%Y-%m-%d").to_string();

    let upcoming_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM appointments
             WHERE date >= ?1 AND status IN ('pending', 'approved')",
            params![today],
            |row| row.get(0),
        )
        .unwrap_or(0);

    let completed_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM appointments WHERE status = 'completed'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    let blocked_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM blocked_slots WHERE date >= ?1",
            params![today],
            |row| row.get(0),
        )
        .unwrap_or(0);

    let deposits_collected_cents: i64 = conn
        .query_row(
            "SELECT COALESCE(SUM(deposit_cents), 0) FROM appointments
             WHERE status NOT IN ('cancelled', 'rejected')",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    let outstanding_balance_cents: i64 = conn
        .query_row(
            "SELECT COALESCE(SUM(remaining_cents), 0) FROM appointments
             WHERE status IN ('pending', 'approved')",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    Ok(DashboardStats {
        upcoming_count,
        completed_count,
        blocked_count,
        deposits_collected_cents,
        outstanding_balance_cents,
    })
}
