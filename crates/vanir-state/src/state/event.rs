use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    fn last_event_id(&self) -> Result<u64, Report> {
        Ok(self.store.get::<u64>("last_event_id/")?.unwrap_or(0))
    }

    /// Append an event, assigning the next dense id. Pending events are
    /// indexed by their inbound hash so observed outbounds can settle them.
    pub fn upsert_event(&mut self, mut event: Event) -> Result<u64, Report> {
        let id = self.last_event_id()? + 1;
        event.id = id;
        self.store.put("last_event_id/", &id);
        self.store.put(&format!("event/{}", pad_height(id)), &event);

        if event.status == EventStatus::Pending && !event.in_tx.id.is_blank() {
            let key = format!("incomplete_event/{}", event.in_tx.id);
            let mut ids = self.store.get::<Vec<u64>>(&key)?.unwrap_or_default();
            ids.push(id);
            self.store.put(&key, &ids);
        }
        Ok(id)
    }

    pub fn get_event(&self, id: u64) -> Result<Option<Event>, Report> {
        self.store.get(&format!("event/{}", pad_height(id)))
    }

    /// Events with ids at or above `from_id`, up to one page of 100.
    pub fn events_from(&self, from_id: u64) -> Result<Vec<Event>, Report> {
        Ok(self
            .store
            .prefix::<Event>("event/")?
            .into_iter()
            .map(|(_, e)| e)
            .filter(|e| e.id >= from_id)
            .take(100)
            .collect())
    }

    /// Pending events waiting on outbound transactions.
    pub fn incomplete_events(&self) -> Result<Vec<Event>, Report> {
        let mut events = vec![];
        for (_, ids) in self.store.prefix::<Vec<u64>>("incomplete_event/")? {
            for id in ids {
                if let Some(event) = self.get_event(id)? {
                    events.push(event);
                }
            }
        }
        events.sort_by_key(|e| e.id);
        Ok(events)
    }

    /// Settle all pending events for an inbound hash to their terminal
    /// status.
    pub fn complete_events(&mut self, in_hash: &TxId) -> Result<(), Report> {
        let key = format!("incomplete_event/{in_hash}");
        let Some(ids) = self.store.get::<Vec<u64>>(&key)? else {
            return Ok(());
        };
        for id in ids {
            if let Some(mut event) = self.get_event(id)? {
                event.status = event.terminal_status();
                self.store.put(&format!("event/{}", pad_height(id)), &event);
            }
        }
        self.store.delete(&key);
        Ok(())
    }
}
