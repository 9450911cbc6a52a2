//! Web UI template for the chat interface

/// Single-page chat UI served at `/`
pub const CHAT_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Stata Llama Editor</title>
  <style>
    * {
      margin: 0;
      padding: 0;
      box-sizing: border-box;
    }

    body {
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto', 'Helvetica Neue', sans-serif;
      background: #f5f5f5;
      min-height: 100vh;
      padding: 20px;
      display: flex;
      align-items: center;
      justify-content: center;
    }

    .container {
      background: white;
      border-radius: 8px;
      box-shadow: 0 2px 8px rgba(0, 0, 0, 0.1);
      border: 1px solid #e0e0e0;
      max-width: 900px;
      width: 100%;
      height: 90vh;
      display: flex;
      flex-direction: column;
      overflow: hidden;
    }

    .header {
      background: white;
      color: #333;
      padding: 20px 30px;
      border-bottom: 1px solid #e0e0e0;
    }

    .header h1 {
      font-size: 20px;
      font-weight: 600;
    }

    .header p {
      font-size: 13px;
      color: #666;
      margin-top: 4px;
    }

    .messages {
      flex: 1;
      overflow-y: auto;
      padding: 20px 30px;
      display: flex;
      flex-direction: column;
      gap: 12px;
    }

    .message {
      max-width: 85%;
      padding: 12px 16px;
      border-radius: 8px;
      font-size: 14px;
      line-height: 1.5;
      white-space: pre-wrap;
      word-break: break-word;
    }

    .message.user {
      align-self: flex-end;
      background: #2563eb;
      color: white;
    }

    .message.assistant {
      align-self: flex-start;
      background: #f0f0f0;
      color: #333;
      font-family: 'SF Mono', Menlo, Consolas, monospace;
      font-size: 13px;
    }

    .message.error {
      align-self: flex-start;
      background: #f8d7da;
      color: #721c24;
    }

    .composer {
      border-top: 1px solid #e0e0e0;
      padding: 16px 30px;
    }

    .toolbar {
      display: flex;
      gap: 8px;
      margin-bottom: 10px;
    }

    .toolbar button {
      padding: 6px 14px;
      border: 1px solid #d0d0d0;
      border-radius: 6px;
      background: white;
      color: #444;
      font-size: 13px;
      cursor: pointer;
    }

    .toolbar button:hover {
      background: #f0f0f0;
    }

    .input-row {
      display: flex;
      gap: 10px;
    }

    textarea {
      flex: 1;
      min-height: 60px;
      padding: 10px 12px;
      border: 1px solid #d0d0d0;
      border-radius: 6px;
      font-size: 14px;
      font-family: inherit;
      resize: vertical;
    }

    textarea:focus {
      outline: none;
      border-color: #2563eb;
    }

    #send {
      padding: 0 24px;
      border: none;
      border-radius: 6px;
      background: #2563eb;
      color: white;
      font-size: 14px;
      font-weight: 500;
      cursor: pointer;
    }

    #send:disabled {
      background: #a0b6e8;
      cursor: not-allowed;
    }
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h1>Stata Llama Editor</h1>
      <p>Ask Stata questions, or paste code and use Explain / Fix / Optimize</p>
    </div>
    <div class="messages" id="messages"></div>
    <div class="composer">
      <div class="toolbar">
        <button onclick="sendCommand('explain')">Explain</button>
        <button onclick="sendCommand('fix')">Fix</button>
        <button onclick="sendCommand('optimize')">Optimize</button>
      </div>
      <div class="input-row">
        <textarea id="input" placeholder="Type a question or paste Stata code..."></textarea>
        <button id="send" onclick="sendMessage()">Send</button>
      </div>
    </div>
  </div>

  <script>
    const messagesEl = document.getElementById('messages');
    const inputEl = document.getElementById('input');
    const sendEl = document.getElementById('send');

    function addMessage(cls, text) {
      const el = document.createElement('div');
      el.className = 'message ' + cls;
      el.textContent = text;
      messagesEl.appendChild(el);
      messagesEl.scrollTop = messagesEl.scrollHeight;
      return el;
    }

    async function streamFrom(url, payload, userText) {
      const text = inputEl.value.trim();
      if (!text) return;
      inputEl.value = '';
      sendEl.disabled = true;
      addMessage('user', userText);
      const assistantEl = addMessage('assistant', '');

      try {
        const resp = await fetch(url, {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify(payload)
        });

        if (!resp.ok) {
          const err = await resp.json().catch(() => ({ error: resp.statusText }));
          assistantEl.className = 'message error';
          assistantEl.textContent = err.error || 'Request failed';
          return;
        }

        const reader = resp.body.getReader();
        const decoder = new TextDecoder();
        let buffer = '';

        for (;;) {
          const { done, value } = await reader.read();
          if (done) break;
          buffer += decoder.decode(value, { stream: true });

          const events = buffer.split('\n\n');
          buffer = events.pop();
          for (const event of events) {
            const line = event.trim();
            if (!line.startsWith('data:')) continue;
            const data = JSON.parse(line.slice(5));
            if (data.content) {
              assistantEl.textContent += data.content;
              messagesEl.scrollTop = messagesEl.scrollHeight;
            } else if (data.error) {
              assistantEl.className = 'message error';
              assistantEl.textContent = data.error;
            }
          }
        }
      } catch (e) {
        assistantEl.className = 'message error';
        assistantEl.textContent = 'Connection error: ' + e.message;
      } finally {
        sendEl.disabled = false;
      }
    }

    function sendMessage() {
      const text = inputEl.value.trim();
      streamFrom('/api/chat', { message: text }, text);
    }

    function sendCommand(command) {
      const code = inputEl.value.trim();
      streamFrom('/api/commands/' + command, { code: code }, '/' + command + ' ' + code);
    }

    inputEl.addEventListener('keydown', (e) => {
      if (e.key === 'Enter' && !e.shiftKey) {
        e.preventDefault();
        sendMessage();
      }
    });
  </script>
</body>
</html>
"#;
